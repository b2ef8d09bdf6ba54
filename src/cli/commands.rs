use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::document::OutputType;
use crate::entity::{Entity, Record};
use crate::error::{PortationError, PortationResult};
use crate::naming::Conventions;
use crate::portation::{Exporter, Importer};
use crate::registry::{ClassRegistry, SchemaConfig};
use crate::schema::extract_columns;
use crate::translate::Catalog;
use crate::types::{Portation, Value};

/// Field of a record file naming the record's class
pub const CLASS_FIELD: &str = "_class";

/// Arguments of `portation export`
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub schema: PathBuf,
    pub records: PathBuf,
    pub output: PathBuf,
    pub format: Option<String>,
    pub class: Option<String>,
    pub sheet_title: Option<String>,
    pub fallback: Option<String>,
    pub delimiter: Option<String>,
    /// Translation catalog replacing the schema's `translations`
    pub translations: Option<PathBuf>,
    pub verbose: bool,
}

/// Arguments of `portation import`
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub schema: PathBuf,
    pub input: PathBuf,
    pub class: String,
    pub output: Option<PathBuf>,
    pub no_header: bool,
    pub delimiter: Option<String>,
    pub verbose: bool,
}

/// Execute the export command
pub fn export(options: ExportOptions) -> PortationResult<PathBuf> {
    println!("{}", "📦 Portation - Export".bold().green());
    println!("   Records: {}", options.records.display());
    println!("   Output:  {}\n", options.output.display());

    let output_type = output_type_for(options.format.as_deref(), &options.output)?;
    let (config, registry) = load_schema(&options.schema)?;
    let records = load_records(&options.records, options.class.as_deref())?;

    if options.verbose {
        println!(
            "   {} records, {} classes, format {}\n",
            records.len(),
            registry.class_names().len(),
            output_type.to_string().bright_blue()
        );
    }

    let mut exporter = Exporter::new(registry);
    let catalog = match &options.translations {
        Some(path) => Catalog::from_file(path)?,
        None => Catalog::from(config.translations.clone()),
    };
    exporter.set_translator(Arc::new(catalog));
    if let Some(labels) = &config.boolean_labels {
        exporter.set_boolean_labels(labels.as_slice())?;
    }

    let entities: Vec<&dyn Entity> = records.iter().map(|r| r as &dyn Entity).collect();
    exporter.set_entities(entities, None, true)?;

    // Command line flags win over class metadata
    if let Some(title) = &options.sheet_title {
        exporter.set_sheet_title(title);
    }
    if let Some(fallback) = &options.fallback {
        exporter.set_fallback_value(fallback);
    }
    if let Some(delimiter) = &options.delimiter {
        exporter.set_csv_delimiter(delimiter);
    }

    if options.verbose {
        for (key, column) in exporter.columns().iter() {
            println!(
                "   {} → {}{}",
                key.bright_blue(),
                column.effective_label(key),
                if column.visible { "" } else { " (hidden)" }
            );
        }
        println!();
    }

    let path = exporter.save_as_file(output_type, &options.output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   {} rows written to {}\n", records.len(), path.display());
    Ok(path)
}

/// Execute the import command
pub fn import(options: ImportOptions) -> PortationResult<Vec<Record>> {
    eprintln!("{}", "📦 Portation - Import".bold().green());
    eprintln!("   Input: {}", options.input.display());
    eprintln!("   Class: {}\n", options.class);

    let (config, registry) = load_schema(&options.schema)?;
    let mut importer = Importer::new(registry);
    importer.set_translator(Arc::new(Catalog::from(config.translations.clone())));
    if let Some(delimiter) = &options.delimiter {
        importer.set_csv_delimiter(delimiter);
    }

    let class = options.class.clone();
    let records = importer.import_file(
        &options.input,
        &options.class,
        !options.no_header,
        true,
        || Record::new(class.clone()),
    )?;

    if options.verbose {
        let keys: Vec<&str> = importer.columns().keys().collect();
        eprintln!("   Columns: {}\n", keys.join(", ").bright_blue());
    }

    let rendered = render_records(&records, options.output.as_deref())?;
    match &options.output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }

    eprintln!("{}", "✅ Import Complete!".bold().green());
    eprintln!("   {} records imported", records.len());

    let not_found = importer.not_found_values();
    if !not_found.is_empty() {
        eprintln!(
            "\n{}",
            format!("⚠️  {} cells could not be mapped:", not_found.len())
                .bold()
                .yellow()
        );
        for cell in not_found {
            eprintln!(
                "   {}{}: {}",
                cell.column.yellow(),
                cell.row.to_string().yellow(),
                cell.value
            );
        }
    }
    Ok(records)
}

/// Execute the columns command: print the schema a class would use
pub fn columns(schema: PathBuf, class: String, mode: Portation, annotate: Option<bool>) -> PortationResult<()> {
    let (_, registry) = load_schema(&schema)?;
    let annotate = match annotate {
        Some(annotate) => annotate,
        None => registry.entity_metadata(&class)?.is_some(),
    };
    let columns = extract_columns(&registry, &class, mode, &Conventions::DEFAULT, true, annotate)?;

    println!("{}", format!("📋 Columns of {}", class).bold().green());
    if columns.is_empty() {
        println!("   {}", "(none)".dimmed());
        return Ok(());
    }

    let layout = columns.layout()?;
    for (key, options) in columns.iter() {
        let cell = layout
            .iter()
            .find(|(placed, _)| *placed == key)
            .map(|(_, col)| crate::document::column_letter(*col))
            .unwrap_or_else(|| "-".to_string());
        let accessor = match mode {
            Portation::Import => &options.setter,
            _ => &options.getter,
        };
        println!(
            "   {:<4} {:<20} {:<20} {}{}",
            cell.bright_blue(),
            key,
            options.effective_label(key),
            accessor,
            if options.visible { "" } else { " (hidden)" }
        );
    }
    Ok(())
}

fn output_type_for(format: Option<&str>, output: &Path) -> PortationResult<OutputType> {
    if let Some(format) = format {
        return format.parse();
    }
    output
        .extension()
        .and_then(|e| OutputType::from_extension(&e.to_string_lossy()))
        .ok_or_else(|| {
            PortationError::invalid(format!(
                "Cannot tell the output format of {}; pass --format",
                output.display()
            ))
        })
}

/// Parse a schema file into its configuration and class registry
pub fn load_schema(path: &Path) -> PortationResult<(SchemaConfig, Arc<ClassRegistry>)> {
    let config = SchemaConfig::from_file(path)?;
    let registry = config.to_registry()?;
    Ok((config, Arc::new(registry)))
}

/// Read a YAML or JSON list of records.
///
/// Each record takes its class from its `_class` field, or from
/// `default_class`.
pub fn load_records(path: &Path, default_class: Option<&str>) -> PortationResult<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    let data: serde_json::Value = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let serde_json::Value::Array(items) = data else {
        return Err(PortationError::invalid(format!(
            "{} must contain a list of records",
            path.display()
        )));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let serde_json::Value::Object(mut fields) = item else {
                return Err(PortationError::invalid(format!("Record {} is not a mapping", idx + 1)));
            };
            let class = match fields.remove(CLASS_FIELD) {
                Some(serde_json::Value::String(class)) => class,
                _ => default_class.map(str::to_string).ok_or_else(|| {
                    PortationError::invalid(format!(
                        "Record {} has no class; add a {} field or pass --class",
                        idx + 1,
                        CLASS_FIELD
                    ))
                })?,
            };
            let mut record = Record::new(class);
            for (name, value) in fields {
                record.set(name, Value::from(value));
            }
            Ok(record)
        })
        .collect()
}

fn render_records(records: &[Record], output: Option<&Path>) -> PortationResult<String> {
    let data = serde_json::Value::Array(records.iter().map(Record::to_json).collect());
    if output.is_some_and(is_json) {
        Ok(serde_json::to_string_pretty(&data)? + "\n")
    } else {
        Ok(serde_yaml::to_string(&data)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_records_with_default_class() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.yaml");
        fs::write(&path, "- { id: 1, lastname: Doe }\n- { _class: Customer, id: 2 }\n").unwrap();

        let records = load_records(&path, Some("Person")).unwrap();
        assert_eq!(records[0].class, "Person");
        assert_eq!(records[0].get("lastname"), Value::from("Doe"));
        assert_eq!(records[1].class, "Customer");
        assert!(!records[1].fields.contains_key(CLASS_FIELD));
    }

    #[test]
    fn test_load_records_requires_class() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("people.json");
        fs::write(&path, r#"[{"id": 1}]"#).unwrap();
        assert!(load_records(&path, None).is_err());
    }

    #[test]
    fn test_output_type_resolution() {
        assert_eq!(
            output_type_for(None, Path::new("out.xlsx")).unwrap(),
            OutputType::Excel2007
        );
        assert_eq!(
            output_type_for(Some("CSV"), Path::new("out")).unwrap(),
            OutputType::Csv
        );
        assert!(output_type_for(None, Path::new("out")).is_err());
    }
}
