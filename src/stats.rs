//! Bookkeeping record for column statistics collection jobs.
//!
//! [`AnalysisJobInfo`] is a flat value object persisted outside the plan
//! tree. It carries three representations: a human-readable [`Display`],
//! a JSON encoding of the column-to-partitions map, and a binary form read
//! and written by older deployments. The binary field order is a
//! compatibility contract and must never change.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};
use std::io::{Read, Write};
use std::str::FromStr;

use strum_macros::{Display as StrumDisplay, EnumString};
use thiserror::Error;

/// Column name to the set of partitions the job covers. Ordered maps keep
/// the serialized forms deterministic.
pub type ColToPartitions = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Error)]
pub enum StatsCodecError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid utf-8 in persisted string: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("unknown enum value in persisted record: {0}")]
    UnknownEnumValue(#[from] strum::ParseError),
    #[error("invalid column-to-partitions json: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid boolean byte {0:#x}")]
    InvalidBool(u8),
}

pub type StatsCodecResult<T> = Result<T, StatsCodecError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    /// Submitted by a user statement.
    Manual,
    /// Submitted by the automatic collector.
    System,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMode {
    Incremental,
    Full,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisMethod {
    Sample,
    Full,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisType {
    Fundamentals,
    Index,
    Histogram,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleType {
    Once,
    Period,
    Automatic,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, StrumDisplay, EnumString)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisState {
    Pending,
    Running,
    Finished,
    Failed,
}

/// One statistics collection job or task. A job row has `task_id == -1`;
/// task rows share the job's `job_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisJobInfo {
    pub job_id: i64,
    pub task_id: i64,
    pub catalog_name: String,
    pub db_name: String,
    pub tbl_name: String,
    pub col_to_partitions: ColToPartitions,
    pub col_name: String,
    pub index_id: i64,
    pub job_type: JobType,
    pub analysis_mode: AnalysisMode,
    pub analysis_method: AnalysisMethod,
    pub analysis_type: AnalysisType,
    pub sample_percent: i32,
    pub sample_rows: i32,
    pub max_bucket_num: i32,
    pub period_time_ms: i64,
    pub last_exec_time_ms: i64,
    pub state: AnalysisState,
    pub schedule_type: ScheduleType,
    pub message: String,
    pub external_table_level_task: bool,
}

impl AnalysisJobInfo {
    pub fn is_job(&self) -> bool {
        self.task_id == -1
    }

    /// The column-to-partitions map as a json string, empty when the map is.
    pub fn col_to_partitions_json(&self) -> StatsCodecResult<String> {
        if self.col_to_partitions.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(&self.col_to_partitions)?)
    }

    pub fn col_to_partitions_from_json(json: &str) -> StatsCodecResult<ColToPartitions> {
        if json.is_empty() {
            return Ok(ColToPartitions::new());
        }
        Ok(serde_json::from_str(json)?)
    }

    /// Persist in the legacy binary layout. Integers are big endian, strings
    /// are u32-length-prefixed utf-8, the map is a length-prefixed entry
    /// sequence of key plus length-prefixed partition set. The field order
    /// below is load-bearing.
    pub fn write_to<W: Write>(&self, out: &mut W) -> StatsCodecResult<()> {
        write_i64(out, self.job_id)?;
        write_i64(out, self.task_id)?;
        write_string(out, &self.catalog_name)?;
        write_string(out, &self.db_name)?;
        write_string(out, &self.tbl_name)?;
        write_u32(out, self.col_to_partitions.len() as u32)?;
        for (col, partitions) in &self.col_to_partitions {
            write_string(out, col)?;
            write_u32(out, partitions.len() as u32)?;
            for partition in partitions {
                write_string(out, partition)?;
            }
        }
        write_string(out, &self.col_name)?;
        write_i64(out, self.index_id)?;
        write_string(out, &self.job_type.to_string())?;
        write_string(out, &self.analysis_mode.to_string())?;
        write_string(out, &self.analysis_method.to_string())?;
        write_string(out, &self.analysis_type.to_string())?;
        write_i32(out, self.sample_percent)?;
        write_i32(out, self.sample_rows)?;
        write_i32(out, self.max_bucket_num)?;
        write_i64(out, self.period_time_ms)?;
        write_i64(out, self.last_exec_time_ms)?;
        write_string(out, &self.state.to_string())?;
        write_string(out, &self.schedule_type.to_string())?;
        write_string(out, &self.message)?;
        write_bool(out, self.external_table_level_task)?;
        Ok(())
    }

    pub fn read_from<R: Read>(input: &mut R) -> StatsCodecResult<Self> {
        let job_id = read_i64(input)?;
        let task_id = read_i64(input)?;
        let catalog_name = read_string(input)?;
        let db_name = read_string(input)?;
        let tbl_name = read_string(input)?;
        let entries = read_u32(input)?;
        let mut col_to_partitions = ColToPartitions::new();
        for _ in 0..entries {
            let col = read_string(input)?;
            let partition_count = read_u32(input)?;
            let mut partitions = BTreeSet::new();
            for _ in 0..partition_count {
                partitions.insert(read_string(input)?);
            }
            col_to_partitions.insert(col, partitions);
        }
        let col_name = read_string(input)?;
        let index_id = read_i64(input)?;
        let job_type = JobType::from_str(&read_string(input)?)?;
        let analysis_mode = AnalysisMode::from_str(&read_string(input)?)?;
        let analysis_method = AnalysisMethod::from_str(&read_string(input)?)?;
        let analysis_type = AnalysisType::from_str(&read_string(input)?)?;
        let sample_percent = read_i32(input)?;
        let sample_rows = read_i32(input)?;
        let max_bucket_num = read_i32(input)?;
        let period_time_ms = read_i64(input)?;
        let last_exec_time_ms = read_i64(input)?;
        let state = AnalysisState::from_str(&read_string(input)?)?;
        let schedule_type = ScheduleType::from_str(&read_string(input)?)?;
        let message = read_string(input)?;
        let external_table_level_task = read_bool(input)?;

        Ok(Self {
            job_id,
            task_id,
            catalog_name,
            db_name,
            tbl_name,
            col_to_partitions,
            col_name,
            index_id,
            job_type,
            analysis_mode,
            analysis_method,
            analysis_type,
            sample_percent,
            sample_rows,
            max_bucket_num,
            period_time_ms,
            last_exec_time_ms,
            state,
            schedule_type,
            message,
            external_table_level_task,
        })
    }
}

impl Display for AnalysisJobInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "AnalysisJobInfo:")?;
        writeln!(f, "JobId: {}", self.job_id)?;
        writeln!(f, "CatalogName: {}", self.catalog_name)?;
        writeln!(f, "DBName: {}", self.db_name)?;
        writeln!(f, "TableName: {}", self.tbl_name)?;
        writeln!(f, "ColumnName: {}", self.col_name)?;
        writeln!(f, "TaskType: {}", self.analysis_type)?;
        writeln!(f, "TaskMode: {}", self.analysis_mode)?;
        writeln!(f, "TaskMethod: {}", self.analysis_method)?;
        writeln!(f, "Message: {}", self.message)?;
        writeln!(f, "CurrentState: {}", self.state)?;
        if self.sample_percent > 0 {
            writeln!(f, "SamplePercent: {}", self.sample_percent)?;
        }
        if self.sample_rows > 0 {
            writeln!(f, "SampleRows: {}", self.sample_rows)?;
        }
        if self.max_bucket_num > 0 {
            writeln!(f, "MaxBucketNum: {}", self.max_bucket_num)?;
        }
        if !self.col_to_partitions.is_empty() {
            let json = self.col_to_partitions_json().map_err(|_| std::fmt::Error)?;
            writeln!(f, "ColToPartitions: {}", json)?;
        }
        if self.last_exec_time_ms > 0 {
            writeln!(f, "LastExecTimeInMs: {}", self.last_exec_time_ms)?;
        }
        if self.period_time_ms > 0 {
            writeln!(f, "PeriodTimeInMs: {}", self.period_time_ms)?;
        }
        Ok(())
    }
}

fn write_i64<W: Write>(out: &mut W, v: i64) -> StatsCodecResult<()> {
    out.write_all(&v.to_be_bytes())?;
    Ok(())
}

fn write_i32<W: Write>(out: &mut W, v: i32) -> StatsCodecResult<()> {
    out.write_all(&v.to_be_bytes())?;
    Ok(())
}

fn write_u32<W: Write>(out: &mut W, v: u32) -> StatsCodecResult<()> {
    out.write_all(&v.to_be_bytes())?;
    Ok(())
}

fn write_bool<W: Write>(out: &mut W, v: bool) -> StatsCodecResult<()> {
    out.write_all(&[v as u8])?;
    Ok(())
}

fn write_string<W: Write>(out: &mut W, s: &str) -> StatsCodecResult<()> {
    write_u32(out, s.len() as u32)?;
    out.write_all(s.as_bytes())?;
    Ok(())
}

fn read_i64<R: Read>(input: &mut R) -> StatsCodecResult<i64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

fn read_i32<R: Read>(input: &mut R) -> StatsCodecResult<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

fn read_u32<R: Read>(input: &mut R) -> StatsCodecResult<u32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_bool<R: Read>(input: &mut R) -> StatsCodecResult<bool> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    match buf[0] {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StatsCodecError::InvalidBool(other)),
    }
}

fn read_string<R: Read>(input: &mut R) -> StatsCodecResult<String> {
    let len = read_u32(input)? as usize;
    let mut buf = vec![0u8; len];
    input.read_exact(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}

#[cfg(test)]
mod tests {
    use maplit::{btreemap, btreeset};

    use super::*;

    fn sample_job() -> AnalysisJobInfo {
        AnalysisJobInfo {
            job_id: 42,
            task_id: -1,
            catalog_name: "internal".to_string(),
            db_name: "sales".to_string(),
            tbl_name: "orders".to_string(),
            col_to_partitions: btreemap! {
                "amount".to_string() => btreeset!{"p1".to_string(), "p2".to_string()},
                "region".to_string() => btreeset!{"p1".to_string()},
            },
            col_name: "amount".to_string(),
            index_id: -1,
            job_type: JobType::Manual,
            analysis_mode: AnalysisMode::Full,
            analysis_method: AnalysisMethod::Sample,
            analysis_type: AnalysisType::Fundamentals,
            sample_percent: 10,
            sample_rows: 0,
            max_bucket_num: 128,
            period_time_ms: 0,
            last_exec_time_ms: 1_700_000_000_000,
            state: AnalysisState::Pending,
            schedule_type: ScheduleType::Once,
            message: String::new(),
            external_table_level_task: false,
        }
    }

    #[test]
    fn test_binary_round_trip() {
        let job = sample_job();
        let mut buf = Vec::new();
        job.write_to(&mut buf).unwrap();
        let decoded = AnalysisJobInfo::read_from(&mut buf.as_slice()).unwrap();
        assert_eq!(job, decoded);
    }

    #[test]
    fn test_binary_layout_prefix() {
        let job = sample_job();
        let mut buf = Vec::new();
        job.write_to(&mut buf).unwrap();
        // job_id, task_id, then the length-prefixed catalog name.
        assert_eq!(&buf[0..8], &42i64.to_be_bytes());
        assert_eq!(&buf[8..16], &(-1i64).to_be_bytes());
        assert_eq!(&buf[16..20], &8u32.to_be_bytes());
        assert_eq!(&buf[20..28], b"internal");
    }

    #[test]
    fn test_enum_strings_round_trip() {
        assert_eq!(JobType::Manual.to_string(), "MANUAL");
        assert_eq!(AnalysisType::Fundamentals.to_string(), "FUNDAMENTALS");
        assert_eq!(
            AnalysisState::from_str("RUNNING").unwrap(),
            AnalysisState::Running
        );
        assert!(ScheduleType::from_str("NEVER").is_err());
    }

    #[test]
    fn test_col_to_partitions_json() {
        let job = sample_job();
        let json = job.col_to_partitions_json().unwrap();
        assert_eq!(
            json,
            r#"{"amount":["p1","p2"],"region":["p1"]}"#
        );
        let parsed = AnalysisJobInfo::col_to_partitions_from_json(&json).unwrap();
        assert_eq!(parsed, job.col_to_partitions);

        let empty = AnalysisJobInfo::col_to_partitions_from_json("").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_is_job() {
        let mut info = sample_job();
        assert!(info.is_job());
        info.task_id = 7;
        assert!(!info.is_job());
    }

    #[test]
    fn test_display_omits_zero_valued_fields() {
        let mut job = sample_job();
        job.col_to_partitions.clear();
        job.sample_percent = 0;
        job.last_exec_time_ms = 0;
        let text = job.to_string();
        assert!(text.contains("JobId: 42"));
        assert!(text.contains("CurrentState: PENDING"));
        assert!(!text.contains("SamplePercent"));
        assert!(!text.contains("ColToPartitions"));
        assert!(!text.contains("LastExecTimeInMs"));
    }
}
