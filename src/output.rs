use chrono::SecondsFormat;
use log::info;
use std::io::Write;
use std::path::Path;

use crate::bursts::{BurstTable, END_TIME};
use crate::error::Result;
use crate::ingest::Joined;

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NA".to_string()
    } else {
        v.to_string()
    }
}

/// Writes the table as CSV: one column per statistic, then `end_time`.
pub fn write_table<W: Write>(table: &BurstTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut header: Vec<&str> = table.field_names().to_vec();
    header.push(END_TIME);
    writer.write_record(&header)?;

    for i in 0..table.len() {
        if let Some((values, end)) = table.row(i) {
            let mut record: Vec<String> = values.into_iter().map(format_value).collect();
            record.push(end.to_rfc3339_opts(SecondsFormat::Millis, false));
            writer.write_record(&record)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn save_table<P: AsRef<Path>>(table: &BurstTable, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving {} bursts to {}", table.len(), path.display());
    write_table(table, std::fs::File::create(path)?)
}

/// Writes a joined record as `time,pressure_mbar,temperature_c`.
pub fn write_joined<W: Write>(joined: &Joined, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["time", "pressure_mbar", "temperature_c"])?;
    let series = &joined.pressure;
    for ((time, pressure), temp) in series.times().iter().zip(series.values()).zip(&joined.temperature_c) {
        writer.write_record([
            time.to_rfc3339_opts(SecondsFormat::Millis, false),
            pressure.to_string(),
            temp.map(|t| t.to_string()).unwrap_or_else(|| "NA".to_string()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_joined<P: AsRef<Path>>(joined: &Joined, path: P) -> Result<()> {
    let path = path.as_ref();
    info!("Saving {} samples to {}", joined.pressure.len(), path.display());
    write_joined(joined, std::fs::File::create(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bursts::Columns;
    use crate::series::TimeSeries;
    use crate::stats::ZeroCrossingStats;
    use chrono::TimeZone;
    use chrono_tz::{America::Los_Angeles, UTC};

    #[test]
    fn test_table_csv_layout() {
        let mut columns: Columns<ZeroCrossingStats> = Columns::new(Los_Angeles);
        let end = UTC.with_ymd_and_hms(2024, 5, 1, 19, 0, 0).unwrap();
        let mut stats = ZeroCrossingStats::nan();
        stats.h_sig = 1.5;
        columns.push(&stats, end);
        let table = BurstTable::from(columns);

        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "h_sig,h_mean,h10,h_max,t_mean,t_sig,end_time");
        assert_eq!(lines[1], "1.5,NA,NA,NA,NA,NA,2024-05-01T12:00:00.000-07:00");
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let table = BurstTable::from(Columns::<ZeroCrossingStats>::new(UTC));
        let mut buf = Vec::new();
        write_table(&table, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_joined_csv() {
        let t0 = UTC.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let joined = Joined {
            pressure: TimeSeries::new(vec![t0], vec![1013.25]).unwrap(),
            temperature_c: vec![None],
        };
        let mut buf = Vec::new();
        write_joined(&joined, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("2024-05-01T00:00:00.000+00:00,1013.25,NA"));
    }
}
