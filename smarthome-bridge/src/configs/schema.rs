use crate::models::{CommandTable, DeviceStateTable, DeviceTable, SensorDataTable, Table};

pub struct SchemaManager {
    tables: Vec<Box<dyn Table + Send + Sync>>,
}

impl SchemaManager {
    pub fn new(tables: Vec<Box<dyn Table + Send + Sync>>) -> Self {
        Self { tables }
    }

    pub fn table_names(&self) -> Vec<&'static str> {
        self.tables.iter().map(|table| table.name()).collect()
    }

    pub fn create_schema(&self) -> Vec<String> {
        self.tables.iter().map(|table| table.create()).collect()
    }

    pub fn dispose_schema(&self) -> Vec<String> {
        self.tables.iter().rev().map(|table| table.dispose()).collect()
    }
}

impl Default for SchemaManager {
    fn default() -> Self {
        SchemaManager::new(vec![
            Box::new(DeviceTable),
            Box::new(SensorDataTable),
            Box::new(DeviceStateTable),
            Box::new(CommandTable),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockTable(&'static str);

    impl Table for MockTable {
        fn name(&self) -> &'static str {
            self.0
        }

        fn create(&self) -> String {
            format!("CREATE TABLE {};", self.0)
        }

        fn dispose(&self) -> String {
            format!("DROP TABLE {};", self.0)
        }
    }

    #[test]
    fn test_dispose_in_reverse_order() {
        let manager = SchemaManager::new(vec![
            Box::new(MockTable("first")),
            Box::new(MockTable("second")),
        ]);

        assert_eq!(
            manager.create_schema(),
            vec!["CREATE TABLE first;", "CREATE TABLE second;"]
        );
        assert_eq!(
            manager.dispose_schema(),
            vec!["DROP TABLE second;", "DROP TABLE first;"]
        );
    }

    #[test]
    fn test_default_tables() {
        assert_eq!(
            SchemaManager::default().table_names(),
            vec!["devices", "sensor_data", "device_states", "commands"]
        );
    }
}
