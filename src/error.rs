//! Error taxonomy for report generation.
//!
//! Every failure is terminal for the current request: callers surface it to
//! the user through [`ReportError::user_message`] and wait for the user to
//! fix the cause and try again. Nothing is retried automatically.

use chrono::NaiveDate;
use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors raised while loading, assembling or emitting a tide report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The tide table (or station list) is missing or could not be parsed
    #[error("tide table {path} unreadable: {reason}")]
    SourceUnreadable { path: PathBuf, reason: String },

    /// The requested end date precedes the start date
    #[error("empty range: {end} is before {start}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    /// A requested day has no records for any selected station
    #[error("no tide data for {0}")]
    MissingDayData(NaiveDate),

    /// The output document could not be written (often: open in another program)
    #[error("cannot write {path}: {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The written document could not be launched
    #[error("cannot open {path}: {reason}")]
    OutputOpenFailed { path: PathBuf, reason: String },

    /// The persisted station selection could not be saved
    #[error("station selection: {0}")]
    Selection(String),

    /// The report could not be serialised for JSON export
    #[error("JSON export failed: {0}")]
    Export(#[from] serde_json::Error),
}

impl ReportError {
    /// Title and message shown to the user in place of a crash.
    pub fn user_message(&self) -> (String, String) {
        const FAILED: &str = "오류가 발생했습니다.";
        match self {
            ReportError::SourceUnreadable { .. } => (
                "오류가 발생했어요".to_string(),
                "프로그램 파일이 깨진 것 같아요.".to_string(),
            ),
            ReportError::EmptyRange { .. } => (
                FAILED.to_string(),
                "종료일이 시작일보다 빠릅니다. 날짜를 다시 골라주세요.".to_string(),
            ),
            ReportError::MissingDayData(date) => (
                FAILED.to_string(),
                format!("해당날짜 데이터가 없습니다. ({date})"),
            ),
            ReportError::OutputWriteFailed { path, source } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let message = match source.kind() {
                    io::ErrorKind::PermissionDenied => {
                        "파일을 만들 수 없습니다. 관리자 권한으로 실행해보세요.".to_string()
                    }
                    _ => format!("같은 이름의 파일이 이미 실행중인 것 같아요.\n바탕화면 : {name}"),
                };
                (FAILED.to_string(), message)
            }
            ReportError::OutputOpenFailed { path, .. } => (
                FAILED.to_string(),
                format!(
                    "파일을 실행할 수 없네요. {}을(를) 직접 실행해보세요.",
                    path.display()
                ),
            ),
            ReportError::Selection(reason) => (
                FAILED.to_string(),
                format!("선택한 지점을 저장하지 못했어요. ({reason})"),
            ),
            ReportError::Export(err) => (
                FAILED.to_string(),
                format!("조석표를 JSON으로 내보내지 못했어요. ({err})"),
            ),
        }
    }
}
