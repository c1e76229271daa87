use std::{fmt::Write as _, thread};

use chrono::{format::DelayedFormat, DateTime, Local};
use crossbeam_channel::{bounded, unbounded, Sender};
use once_cell::sync::Lazy;
use strum::Display;

use crate::logging::rotate::Rotate;

pub mod rotate;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 一行累積到這個大小就先寫入檔案
const BATCH_SIZE: usize = 4096;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

enum Command {
    Write(LogMessage),
    Flush(Sender<()>),
}

pub struct Logger {
    writer: Sender<Command>,
}

impl Logger {
    /// 建立一個寫入 `log/<日期>-<name>.log` 的 logger
    pub fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<Command>();
        let pattern = format!("log/%Y-%m-%d-{}.log", log_name);

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut rotate = Rotate::new(pattern);
            let mut line = String::with_capacity(BATCH_SIZE);

            while let Ok(received) = rx.recv() {
                match received {
                    Command::Write(msg) => {
                        if writeln!(
                            &mut line,
                            "{} {} {}",
                            msg.created_at.format("%F %X%.6f"),
                            msg.level,
                            msg.msg
                        )
                        .is_err()
                        {
                            continue;
                        }

                        if rx.is_empty() || line.len() >= BATCH_SIZE {
                            write_line(&mut rotate, &mut line);
                        }
                    }
                    Command::Flush(ack) => {
                        write_line(&mut rotate, &mut line);
                        rotate.flush();
                        let _ = ack.send(());
                    }
                }
            }
        });

        Logger { writer: tx }
    }

    pub fn debug(&self, log: String) {
        self.send(Level::Debug, log);
    }

    pub fn info(&self, log: String) {
        self.send(Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(Level::Error, log);
    }

    /// 等待背景線程把目前佇列中的訊息都寫進檔案
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded::<()>(1);
        if self.writer.send(Command::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self
            .writer
            .send(Command::Write(LogMessage::new(level, msg)))
        {
            error_console(why.to_string());
        }
    }
}

fn write_line(rotate: &mut Rotate, line: &mut String) {
    if line.is_empty() {
        return;
    }

    if let Err(why) = rotate.write_msg(Local::now(), line.as_bytes()) {
        error_console(format!(
            "Failed to write log file {} because {:?}",
            rotate.current_file(),
            why
        ));
        info_console(line.clone());
    }

    line.clear();
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

/// 程式結束前呼叫，確保 default 與 http 的日誌都已寫入
pub fn flush() {
    LOGGER.flush();
    crate::util::http::flush_log();
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
