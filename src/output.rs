use std::fs;
use std::path::Path;

use csv::Writer;

use crate::errors::{CrackScanError, Result};
use crate::measure::CrackMeasurement;

/// Write the measurement list to CSV, one row per crack
pub fn write_measurements_csv<P: AsRef<Path>>(
    measurements: &[CrackMeasurement],
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("measurements")
        .join(format!("{}.csv", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(CrackScanError::Io)?;
    }

    let mut writer = Writer::from_path(&output_path).map_err(CrackScanError::CsvOutput)?;

    writer
        .write_record([
            "Crack_Index",
            "Width_Px",
            "Length_Px",
            "Center_X",
            "Center_Y",
            "Area_Px",
        ])
        .map_err(CrackScanError::CsvOutput)?;

    for (index, crack) in measurements.iter().enumerate() {
        writer
            .write_record([
                (index + 1).to_string(),
                format!("{:.1}", crack.width),
                format!("{:.1}", crack.length),
                format!("{:.1}", crack.center_x),
                format!("{:.1}", crack.center_y),
                crack.area.to_string(),
            ])
            .map_err(CrackScanError::CsvOutput)?;
    }

    writer
        .flush()
        .map_err(|e| CrackScanError::CsvOutput(csv::Error::from(e)))?;

    Ok(())
}

/// Write the measurement list as a JSON summary
pub fn write_measurements_json<P: AsRef<Path>>(
    measurements: &[CrackMeasurement],
    output_dir: P,
    filename: &str,
) -> Result<()> {
    let output_path = output_dir
        .as_ref()
        .join("measurements")
        .join(format!("{}.json", filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(CrackScanError::Io)?;
    }

    let json = serde_json::to_string_pretty(measurements).map_err(CrackScanError::JsonOutput)?;
    fs::write(&output_path, json).map_err(CrackScanError::Io)?;

    Ok(())
}

/// Print the measurement report to the console
pub fn print_measurements(measurements: &[CrackMeasurement]) {
    println!("\nCrack Measurements:");

    if measurements.is_empty() {
        println!("  (no cracks above the minimum pixel threshold)");
        return;
    }

    for (index, crack) in measurements.iter().enumerate() {
        println!("Crack {}:", index + 1);
        println!("  Width: {:.1} pixels", crack.width);
        println!("  Length: {:.1} pixels", crack.length);
        println!("  Center: ({:.1}, {:.1})", crack.center_x, crack.center_y);
        println!("  Area: {} pixels", crack.area);
    }
}
