//! Provider Classification
//!
//! Resolves the sending department of every record to a provider label
//! through the static mapping table. Total: unmapped departments get the
//! sentinel, never an absent label.

use mailkpi_core::{ProviderMap, Record, RecordSet};

/// Department → provider classifier
#[derive(Clone, Debug, Default)]
pub struct Classifier {
    map: ProviderMap,
}

impl Classifier {
    pub fn new(map: ProviderMap) -> Self {
        Self { map }
    }

    /// The provider label for one record
    pub fn provider(&self, record: &Record) -> &str {
        self.map.resolve(&record.department)
    }

    /// Fill `provider` on every record
    pub fn apply(&self, mut table: RecordSet) -> RecordSet {
        for record in &mut table.records {
            record.provider = self.provider(record).to_string();
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailkpi_core::UNKNOWN_PROVIDER;
    use pretty_assertions::assert_eq;

    #[test]
    fn maps_documented_departments() {
        let classifier = Classifier::default();
        let record = Record::new().department("3 GRUPO JUNTAS DE CALIFICACIÓN");
        assert_eq!(classifier.provider(&record), "BELISARIO");
    }

    #[test]
    fn unmapped_departments_get_the_sentinel() {
        let classifier = Classifier::default();
        let record = Record::new().department("UNKNOWN DEPT");
        assert_eq!(classifier.provider(&record), UNKNOWN_PROVIDER);
    }

    #[test]
    fn every_record_has_a_provider_after_classification() {
        let classifier = Classifier::default();
        let table = classifier.apply(
            vec![
                Record::new().department("6 GRUPO CENTRO DE EXCELENCIA"),
                Record::new().department("OFICINA EXTERNA"),
                Record::new(),
            ]
            .into(),
        );
        for record in &table.records {
            assert!(!record.provider.is_empty());
        }
        assert_eq!(table.records[0].provider, "GESTAR INNOVACION");
        assert_eq!(table.records[1].provider, UNKNOWN_PROVIDER);
        assert_eq!(table.records[2].provider, UNKNOWN_PROVIDER);
    }
}
