//! End-to-end rendering over a parsed export.
//!
//! Covers the full path from semicolon-delimited CSV bytes to workbook
//! bytes: the sheet set driven by real pipeline output, graceful
//! rendering when the courier partition is empty, and provider labels
//! that collide after worksheet-name truncation.

use chrono::NaiveDate;
use mailkpi_core::ProviderMap;
use mailkpi_engine::{Pipeline, StaticCalendar};
use mailkpi_render::ReportBuilder;

const EXPORT: &str = "\
FECHA RADICACION;FECHA RECIBIDO CORRESPONDENCIA;MEDIO DE ENVIO;DEPENDENCIA QUE ENVIA;MES;OBSERVACIÓN;RADICADO
2024-05-06;2024-05-08;Courier;4 GRUPO CENTRO DE EXCELENCIA;MAYO;;R-101
2024-05-06;2024-05-07;Courier;3 GRUPO CENTRO DE EXCELENCIA;MAYO;;R-102
2024-04-30;2024-05-02;Courier;5 GRUPO JUNTAS DE CALIFICACIÓN;ABRIL;revisar EXCLUIR;R-103
2024-05-07;2024-05-07;Consolidado;OFICINA JURIDICA;MAYO;;R-104
";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn pipeline_data(csv: &str) -> mailkpi_core::ReportData {
    let table = mailkpi_parser::load_records(csv.as_bytes()).unwrap();
    Pipeline::new()
        .run_date(date(2024, 5, 7))
        .run(table, &StaticCalendar::default())
}

#[test]
fn full_export_renders_to_a_workbook() {
    let bytes = ReportBuilder::new().render(&pipeline_data(EXPORT)).unwrap();

    assert_eq!(&bytes[0..2], b"PK");
    assert!(bytes.len() > 1000);
}

#[test]
fn values_only_rendering_also_succeeds() {
    let builder = ReportBuilder::new()
        .use_formulas(false)
        .include_charts(false);
    let bytes = builder.render(&pipeline_data(EXPORT)).unwrap();

    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn an_export_without_courier_rows_still_renders() {
    let csv = "\
FECHA RADICACION;FECHA RECIBIDO CORRESPONDENCIA;MEDIO DE ENVIO;DEPENDENCIA QUE ENVIA;MES;OBSERVACIÓN
2024-05-07;2024-05-07;Consolidado;OFICINA JURIDICA;MAYO;
";
    let bytes = ReportBuilder::new().render(&pipeline_data(csv)).unwrap();

    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn provider_labels_colliding_after_truncation_render_distinct_sheets() {
    // Both labels agree over their first 31 characters; without the
    // worksheet-name suffixing the second sheet would be rejected as a
    // duplicate.
    let map = ProviderMap::with_unknown("DESCONOCIDO")
        .entry(
            "4 GRUPO CENTRO DE EXCELENCIA",
            "GERENCIA MEDICA JUNTAS DE CALIFICACION NORTE",
        )
        .entry(
            "3 GRUPO CENTRO DE EXCELENCIA",
            "GERENCIA MEDICA JUNTAS DE CALIFICACION SUR",
        );
    let table = mailkpi_parser::load_records(EXPORT.as_bytes()).unwrap();
    let data = Pipeline::new()
        .run_date(date(2024, 5, 7))
        .provider_map(map)
        .run(table, &StaticCalendar::default());

    let bytes = ReportBuilder::new().render(&data).unwrap();

    assert_eq!(&bytes[0..2], b"PK");
}
