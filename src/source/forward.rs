// フォワードイテレーター - 長さ不明のソースから1件ずつ読み出す

use futures::future::BoxFuture;
use std::fmt;

/// 継続条件と読み出し関数で駆動される前方専用イテレーター
///
/// 状態は `read()` だけが変更する。条件が偽を返すと `current` はクリアされる。
pub struct ForwardIterator<Rd, C, P, T> {
    reader: Rd,
    condition: C,
    provider: P,
    current: Option<T>,
    exhausted: bool,
    reads: usize,
}

impl<Rd, C, P, T> ForwardIterator<Rd, C, P, T>
where
    C: FnMut(&mut Rd) -> bool,
    P: FnMut(&mut Rd) -> T,
{
    pub fn new(reader: Rd, condition: C, provider: P) -> Self {
        Self {
            reader,
            condition,
            provider,
            current: None,
            exhausted: false,
            reads: 0,
        }
    }

    /// 次の要素を読み出す
    ///
    /// 条件が真なら要素を取得して `current` に保持し true を返す。
    /// 偽なら `current` をクリアして false を返す。
    pub fn read(&mut self) -> bool {
        if (self.condition)(&mut self.reader) {
            self.current = Some((self.provider)(&mut self.reader));
            self.reads += 1;
            true
        } else {
            self.current = None;
            self.exhausted = true;
            false
        }
    }

    /// 条件が一度でも偽を返したか
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<Rd, C, P, T> ForwardIterator<Rd, C, P, T> {
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    /// 成功した読み出し回数
    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn into_reader(self) -> Rd {
        self.reader
    }
}

impl<Rd, C, P, T> Iterator for ForwardIterator<Rd, C, P, T>
where
    C: FnMut(&mut Rd) -> bool,
    P: FnMut(&mut Rd) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.exhausted || !self.read() {
            return None;
        }
        self.take_current()
    }
}

impl<Rd, C, P, T> fmt::Debug for ForwardIterator<Rd, C, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwardIterator")
            .field("has_current", &self.current.is_some())
            .field("exhausted", &self.exhausted)
            .field("reads", &self.reads)
            .finish()
    }
}

/// 継続条件が非同期な前方専用イテレーター
///
/// 条件の評価が唯一の待機点で、読み出し関数は同期的に呼ばれる。
pub struct AsyncForwardIterator<Rd, C, P, T> {
    reader: Rd,
    condition: C,
    provider: P,
    current: Option<T>,
    exhausted: bool,
    reads: usize,
}

impl<Rd, C, P, T> AsyncForwardIterator<Rd, C, P, T>
where
    C: for<'a> FnMut(&'a mut Rd) -> BoxFuture<'a, bool>,
    P: FnMut(&mut Rd) -> T,
{
    pub fn new(reader: Rd, condition: C, provider: P) -> Self {
        Self {
            reader,
            condition,
            provider,
            current: None,
            exhausted: false,
            reads: 0,
        }
    }

    /// 次の要素を読み出す
    pub async fn read(&mut self) -> bool {
        if (self.condition)(&mut self.reader).await {
            self.current = Some((self.provider)(&mut self.reader));
            self.reads += 1;
            true
        } else {
            self.current = None;
            self.exhausted = true;
            false
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl<Rd, C, P, T> AsyncForwardIterator<Rd, C, P, T> {
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    pub fn into_reader(self) -> Rd {
        self.reader
    }
}

impl<Rd, C, P, T> fmt::Debug for AsyncForwardIterator<Rd, C, P, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncForwardIterator")
            .field("has_current", &self.current.is_some())
            .field("exhausted", &self.exhausted)
            .field("reads", &self.reads)
            .finish()
    }
}
