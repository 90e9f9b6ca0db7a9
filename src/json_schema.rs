/// Generates the JSON schema object advertised for a tool input type.
#[macro_export]
macro_rules! schema_from_type {
    ($type:ty) => {{
        // Draft-07 keeps older MCP clients happy.
        let settings = schemars::generate::SchemaSettings::draft07();
        let generator = settings.into_generator();
        let schema = generator.into_root_schema_for::<$type>();
        match serde_json::to_value(schema) {
            Ok(serde_json::Value::Object(schema)) => schema,
            _ => panic!("Failed to generate schema for {}", stringify!($type)),
        }
    }};
}
