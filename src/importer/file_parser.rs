// ==========================================
// 联系人导入系统 - CSV 数据源
// ==========================================
// 职责: 按行流式读取 CSV，产出原始记录
// 约束:
// - 表头 TRIM；数据单元格保持原样（不 TRIM）
// - 解析在阻塞线程中进行，经有界通道交给消费端，写库慢时反压读文件
// - 流结束（None）与单行数据/错误严格区分；读错误后流终止
// ==========================================

use crate::domain::contact::{ContactField, RawRecord};
use crate::importer::error::{ImportError, ImportResult};
use csv::{ReaderBuilder, StringRecord, Trim};
use futures::stream::{self, Stream};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// 原始记录流
pub type RecordStream = Pin<Box<dyn Stream<Item = ImportResult<RawRecord>> + Send>>;

/// 默认通道容量
pub const DEFAULT_SOURCE_BUFFER: usize = 64;

/// 表头别名 → 标准列名
const HEADER_ALIASES: &[(&str, &str)] = &[("eircode", "postal_code")];

/// 标准化表头名称
pub fn canonical_header(header: &str) -> String {
    let trimmed = header.trim();
    HEADER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == trimmed)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

// ==========================================
// CsvSource
// ==========================================
pub struct CsvSource {
    path: PathBuf,
    buffer: usize,
}

impl CsvSource {
    pub fn new<P: AsRef<Path>>(path: P, buffer: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            buffer,
        }
    }

    /// 打开文件并返回记录流（需在 tokio 运行时内调用）
    ///
    /// # 返回
    /// - Ok(RecordStream): 表头校验通过后的惰性记录流
    /// - Err: 文件不存在 / 扩展名不支持 / 表头缺列
    pub fn open(&self) -> ImportResult<RecordStream> {
        let path = self.path.as_path();

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        info!(file_path = %path.display(), "打开 CSV 数据源");
        Self::from_reader(file, self.buffer)
    }

    /// 从任意 Read 构造记录流
    pub fn from_reader<R: Read + Send + 'static>(
        reader: R,
        buffer: usize,
    ) -> ImportResult<RecordStream> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致，缺失单元格按空值处理
            .trim(Trim::Headers)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(canonical_header).collect();

        let missing: Vec<String> = ContactField::ALL
            .iter()
            .map(|f| f.column())
            .filter(|col| !headers.iter().any(|h| h == col))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }
        debug!(headers = ?headers, "CSV 表头校验通过");

        let (tx, rx) = mpsc::channel::<ImportResult<RawRecord>>(buffer.max(1));

        let reader_task = tokio::task::spawn_blocking(move || {
            for result in reader.into_records() {
                let item = result
                    .map(|record| to_raw_record(&headers, &record))
                    .map_err(ImportError::from);
                let is_err = item.is_err();

                // 消费端已放弃
                if tx.blocking_send(item).is_err() {
                    break;
                }
                if is_err {
                    break;
                }
            }
        });

        let stream = stream::unfold((rx, Some(reader_task)), |(mut rx, reader_task)| async move {
            if let Some(item) = rx.recv().await {
                return Some((item, (rx, reader_task)));
            }

            // 通道关闭：读取线程异常退出时补发一条错误，不当作正常结束
            match reader_task?.await {
                Ok(()) => None,
                Err(e) => {
                    error!(error = %e, "CSV 读取线程异常退出");
                    Some((Err(ImportError::SourceInterrupted(e.to_string())), (rx, None)))
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

/// 一行 CSV → 原始记录（缺失单元格视为空值）
fn to_raw_record(headers: &[String], record: &StringRecord) -> RawRecord {
    headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            (
                header.clone(),
                record.get(idx).unwrap_or_default().to_string(),
            )
        })
        .collect()
}

/// 由内存中的记录构造记录流
pub fn records_stream<I>(records: I) -> RecordStream
where
    I: IntoIterator<Item = ImportResult<RawRecord>>,
    I::IntoIter: Send + 'static,
{
    Box::pin(stream::iter(records))
}
