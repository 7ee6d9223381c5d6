use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::sync::Once;

mod loss;
mod params;

/// 把日志记到当前测试线程上，各测试互不干扰
struct CaptureLogger;

thread_local! {
    static RECORDS: RefCell<Vec<(Level, String)>> = const { RefCell::new(Vec::new()) };
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.with(|records| {
            records
                .borrow_mut()
                .push((record.level(), record.args().to_string()));
        });
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;
static INIT: Once = Once::new();

/// 安装记录器并清空当前线程已记下的日志
fn capture_logs() {
    INIT.call_once(|| {
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
    RECORDS.with(|records| records.borrow_mut().clear());
}

/// 取出当前线程记下的日志
fn take_logs() -> Vec<(Level, String)> {
    RECORDS.with(RefCell::take)
}

/// 断言恰有一条指定级别且包含 `text` 的日志
fn assert_logged(logs: &[(Level, String)], level: Level, text: &str) {
    let hits: Vec<_> = logs
        .iter()
        .filter(|(l, msg)| *l == level && msg.contains(text))
        .collect();
    assert_eq!(hits.len(), 1, "期望一条{level}日志包含`{text}`，实际日志：{logs:?}");
}
