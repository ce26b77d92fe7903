use super::{build_options, cancel_on_ctrl_c, print_report};
use crate::cli::CommonOptions;
use crate::core::CancellationToken;
use crate::engine::ChunkedDispatchEngine;
use crate::services::{ConsoleProgressReporter, ResultCollator};
use crate::source::ForwardIterator;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

/// 行番号付きの1行
#[derive(Debug)]
pub struct NumberedLine {
    pub number: usize,
    pub text: io::Result<String>,
}

/// 1行ずつ先読みする読み出しカーソル
///
/// 読み込みエラーは1件の要素として渡し、以降は枯渇扱いにする。
pub struct LineCursor<B> {
    reader: B,
    pending: Option<io::Result<String>>,
    line_number: usize,
    failed: bool,
}

impl<B: BufRead> LineCursor<B> {
    pub fn new(reader: B) -> Self {
        Self {
            reader,
            pending: None,
            line_number: 0,
            failed: false,
        }
    }

    /// 次の行があるか（継続条件）
    pub fn has_more(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        if self.failed {
            return false;
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => false,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                self.pending = Some(Ok(line));
                true
            }
            Err(error) => {
                self.failed = true;
                self.pending = Some(Err(error));
                true
            }
        }
    }

    /// 先読みした行を取り出す
    pub fn next_line(&mut self) -> NumberedLine {
        self.line_number += 1;
        NumberedLine {
            number: self.line_number,
            text: self.pending.take().unwrap_or_else(|| Ok(String::new())),
        }
    }
}

/// 1行あたりの単語数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineWordCount {
    pub line: usize,
    pub words: usize,
}

impl fmt::Display for LineWordCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.line, self.words)
    }
}

/// 行の単語数を数える作業単位
pub fn count_words(line: NumberedLine, token: &CancellationToken) -> Result<LineWordCount> {
    token.ensure_active()?;
    let text = line
        .text
        .with_context(|| format!("{} 行目を読み込めませんでした", line.number))?;

    Ok(LineWordCount {
        line: line.number,
        words: text.split_whitespace().count(),
    })
}

/// Execute lines command on the synchronous engine
pub async fn execute_lines(file: PathBuf, common: CommonOptions) -> Result<()> {
    let handle = File::open(&file)
        .with_context(|| format!("Cannot open input file: {}", file.display()))?;

    let token = CancellationToken::new();
    let options = build_options(&common, token.clone())?;
    let reporter = if common.quiet || common.json {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };

    if !common.quiet && !common.json {
        println!("📄 {} を行単位で処理します", file.display());
    }

    let engine = ChunkedDispatchEngine::new(options, reporter);
    let lines = ForwardIterator::new(
        LineCursor::new(BufReader::new(handle)),
        LineCursor::has_more,
        LineCursor::next_line,
    );
    let signal = cancel_on_ctrl_c(token);

    // 同期エンジンはチャンクごとにブロックするため専用スレッドで実行
    let report = tokio::task::spawn_blocking(move || {
        engine.execute(lines, ResultCollator::new(), count_words)
    })
    .await;
    signal.abort();

    print_report(report??, common.json)
}
