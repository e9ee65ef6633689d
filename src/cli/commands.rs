use crate::core::{records_from_json, BindMode, DynamicRecord, ImportReport, RejectedRow};
use crate::error::SheetbindResult;
use crate::excel::ExcelImporter;
use crate::parser::{self, TemplateConfig};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

/// Bind mode selected by the `--declared-only` flag
fn bind_mode(declared_only: bool) -> BindMode {
    if declared_only {
        BindMode::Declared
    } else {
        BindMode::Hierarchy
    }
}

/// Write JSON to a file, or to stdout when no path is given
fn write_json(value: &serde_json::Value, output: Option<&Path>) -> SheetbindResult<()> {
    let text = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => fs::write(path, text)?,
        None => println!("{}", text),
    }
    Ok(())
}

/// One-line description of a dropped row
fn describe_rejected(rejected: &RejectedRow) -> String {
    format!(
        "row {}, column {} ({}): {} - {}",
        rejected.row,
        rejected.column + 1,
        rejected.title,
        rejected.code.as_str(),
        rejected.code.message()
    )
}

/// Records of an import report as a JSON array
pub fn records_json(report: &ImportReport<DynamicRecord>) -> serde_json::Value {
    serde_json::Value::Array(report.records.iter().map(DynamicRecord::to_json).collect())
}

/// Execute the read command: print normalized rows as JSON
pub fn read(file: PathBuf, all_sheets: bool) -> SheetbindResult<()> {
    let importer = ExcelImporter::new(&file);
    let json = if all_sheets {
        serde_json::to_value(importer.read_all_sheets()?)?
    } else {
        serde_json::to_value(importer.read_first_sheet()?)?
    };
    write_json(&json, None)
}

/// Execute the import command
pub fn import(
    file: PathBuf,
    template: PathBuf,
    declared_only: bool,
    report: bool,
    output: Option<PathBuf>,
) -> SheetbindResult<()> {
    let config = parser::parse_template(&template)?;
    let columns = config.build()?;

    let importer = ExcelImporter::new(&file);
    let result = importer.import_report(&columns, bind_mode(declared_only), DynamicRecord::new)?;

    write_json(&records_json(&result), output.as_deref())?;

    eprintln!(
        "{} {} of {} rows imported from {}",
        "✅".green(),
        result.records.len().to_string().bold(),
        result.total_rows,
        file.display()
    );
    if report {
        for rejected in &result.rejected {
            eprintln!("   {} {}", "❌".red(), describe_rejected(rejected));
        }
    } else if !result.rejected.is_empty() {
        eprintln!(
            "   {} {} rows dropped (use --report for details)",
            "⚠️".yellow(),
            result.rejected.len()
        );
    }
    if let Some(path) = &output {
        eprintln!("   JSON file: {}", path.display());
    }
    Ok(())
}

/// Execute the export command
pub fn export(
    input: PathBuf,
    template: PathBuf,
    output: PathBuf,
    sheet: Option<String>,
) -> SheetbindResult<()> {
    println!("{}", "📊 Sheetbind - Excel Export".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", output.display());

    let config = parser::parse_template(&template)?;
    let mut exporter = config.exporter()?;
    if let Some(sheet) = sheet {
        exporter = exporter.with_sheet_name(sheet);
    }

    let content = fs::read_to_string(&input)?;
    let json: serde_json::Value = serde_json::from_str(&content)?;
    let records = records_from_json(&json)?;
    exporter.export(&records, &output)?;

    println!("{}", "✅ Export Complete!".bold().green());
    println!("   Sheet:   {}", exporter.sheet_name().bright_blue());
    println!("   Records: {}", records.len());
    Ok(())
}

/// Execute the template command: validate a template file and list its columns
pub fn template(file: PathBuf) -> SheetbindResult<()> {
    let config = parser::parse_template(&file)?;
    print_template(&config);
    Ok(())
}

fn print_template(config: &TemplateConfig) {
    println!("{} {}", "📋 Template:".bold().green(), config.name.bright_blue().bold());
    if let Some(filename) = &config.filename {
        println!("   File name:    {}.xlsx", filename);
    }
    if let Some(sheet) = &config.sheet {
        println!("   Sheet:        {}", sheet);
    }
    println!("   Column width: {}\n", config.column_width);

    for (idx, column) in config.columns.iter().enumerate() {
        let required = if column.required {
            "required".yellow().to_string()
        } else {
            "optional".dimmed().to_string()
        };
        println!(
            "   {:>2}. {} → {} ({}, max {}, {})",
            idx + 1,
            column.title.cyan(),
            column.field,
            column.kind,
            column.max_length,
            required
        );
        if !column.options.is_empty() {
            println!("       options: {}", column.options.join(", "));
        }
        if let Some(pattern) = &column.pattern {
            println!("       pattern: {}", pattern);
        }
    }
    println!();
    println!("{}", "✅ Template is valid".bold().green());
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
