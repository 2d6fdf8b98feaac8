use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::OnceLock;

// 콘솔 출력과 함께 기록할 로그 파일 (선택 사항)
static LOG_FILE: OnceLock<Mutex<Option<File>>> = OnceLock::new();

pub struct Logger;

impl Logger {
    /// Mirror every message into `log_path` in addition to the console.
    ///
    /// Calling this again replaces the previous sink.
    pub fn init(log_path: &Path) -> io::Result<()> {
        // 디렉토리가 없으면 생성
        if let Some(dir) = log_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(log_path)?;

        let slot = LOG_FILE.get_or_init(|| Mutex::new(None));
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(file);
        }
        Ok(())
    }

    pub fn log(message: &str) {
        println!("{message}");
        Self::write_file("INFO", message);
    }

    pub fn log_warn(message: &str) {
        eprintln!("warning: {message}");
        Self::write_file("WARN", message);
    }

    pub fn log_error(message: &str) {
        eprintln!("error: {message}");
        Self::write_file("ERROR", message);
    }

    fn write_file(level: &str, message: &str) {
        let Some(slot) = LOG_FILE.get() else {
            return;
        };
        if let Ok(mut guard) = slot.lock() {
            if let Some(file) = guard.as_mut() {
                let stamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
                if let Err(e) = writeln!(file, "[{stamp}] {level:<5} {message}") {
                    eprintln!("로그 파일 쓰기 실패: {e}");
                }
            }
        }
    }

    pub fn flush() -> io::Result<()> {
        if let Some(slot) = LOG_FILE.get() {
            if let Ok(mut guard) = slot.lock() {
                if let Some(file) = guard.as_mut() {
                    file.flush()?;
                }
            }
        }
        Ok(())
    }
}

#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log(&message);
    }};
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log_warn(&message);
    }};
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::utils::Logger::log_error(&message);
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_sink_receives_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("analysis.log");

        Logger::init(&path).unwrap();
        Logger::log("in-time ratio ready");
        Logger::log_warn("result file not written yet");
        Logger::flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("INFO  in-time ratio ready"));
        assert!(contents.contains("WARN  result file not written yet"));
    }
}
