// ループルールセット - 数値的な反復空間の定義

pub mod step;

pub use step::{Assignment, Relation, Steppable};

use serde::{Deserialize, Serialize};

/// 数値ループの反復空間 (開始値, 境界, 比較関係, 更新演算子, ステップ値)
///
/// 構築後は不変。比較関係と更新演算子が境界へ収束しない組み合わせは検出しない。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopRuleset<T> {
    from: T,
    to: T,
    relation: Relation,
    assignment: Assignment,
    step: T,
}

impl<T: Steppable> LoopRuleset<T> {
    pub fn new(from: T, to: T, relation: Relation, assignment: Assignment, step: T) -> Self {
        Self {
            from,
            to,
            relation,
            assignment,
            step,
        }
    }

    /// `for (i = from; i < to; i += step)` 相当
    pub fn ascending(from: T, to: T, step: T) -> Self {
        Self::new(from, to, Relation::LessThan, Assignment::Add, step)
    }

    /// `for (i = from; i > to; i -= step)` 相当
    pub fn descending(from: T, to: T, step: T) -> Self {
        Self::new(from, to, Relation::GreaterThan, Assignment::Subtract, step)
    }

    pub fn from(&self) -> T {
        self.from
    }

    pub fn to(&self) -> T {
        self.to
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }

    pub fn assignment(&self) -> Assignment {
        self.assignment
    }

    pub fn step(&self) -> T {
        self.step
    }

    /// 開始値の時点で継続条件が偽なら空
    pub fn is_empty(&self) -> bool {
        !step::test(self.from, self.relation, self.to)
    }

    /// ステップ計算機で生成されるループ変数を順に返すイテレータ
    pub fn values(&self) -> RulesetValues<T> {
        RulesetValues {
            ruleset: *self,
            current: self.from,
            finished: false,
        }
    }
}

/// ルールセットが生成するループ変数の列
#[derive(Debug, Clone)]
pub struct RulesetValues<T> {
    ruleset: LoopRuleset<T>,
    current: T,
    finished: bool,
}

impl<T: Steppable> RulesetValues<T> {
    pub fn ruleset(&self) -> &LoopRuleset<T> {
        &self.ruleset
    }
}

impl<T: Steppable> Iterator for RulesetValues<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.finished {
            return None;
        }

        let ruleset = &self.ruleset;
        if !step::test(self.current, ruleset.relation, ruleset.to) {
            self.finished = true;
            return None;
        }

        let value = self.current;
        // 型の範囲外へ進む場合はこの値で打ち切る
        match step::advance(value, ruleset.assignment, ruleset.step) {
            Some(next) => self.current = next,
            None => self.finished = true,
        }
        Some(value)
    }
}

impl<T: Steppable> std::iter::FusedIterator for RulesetValues<T> {}
