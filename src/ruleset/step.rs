// ステップ計算機 - ループ変数の前進と継続判定

use serde::{Deserialize, Serialize};
use std::fmt;

/// 継続判定に使う比較関係
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Relation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThan => ">",
            Self::GreaterOrEqual => ">=",
            Self::LessThan => "<",
            Self::LessOrEqual => "<=",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ループ変数の更新演算子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignment {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Assignment {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+=",
            Self::Subtract => "-=",
            Self::Multiply => "*=",
            Self::Divide => "/=",
        }
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// ループ変数として使える数値型
///
/// 整数はオーバーフローやゼロ除算で `None` を返す。浮動小数点は常に `Some`。
pub trait Steppable: Copy + PartialOrd {
    fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self>;
}

macro_rules! impl_steppable_for_integers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Steppable for $ty {
                fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self> {
                    match assignment {
                        Assignment::Add => self.checked_add(step),
                        Assignment::Subtract => self.checked_sub(step),
                        Assignment::Multiply => self.checked_mul(step),
                        Assignment::Divide => self.checked_div(step),
                    }
                }
            }
        )*
    };
}

macro_rules! impl_steppable_for_floats {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Steppable for $ty {
                fn checked_step(self, assignment: Assignment, step: Self) -> Option<Self> {
                    Some(match assignment {
                        Assignment::Add => self + step,
                        Assignment::Subtract => self - step,
                        Assignment::Multiply => self * step,
                        Assignment::Divide => self / step,
                    })
                }
            }
        )*
    };
}

impl_steppable_for_integers!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_steppable_for_floats!(f32, f64);

/// 演算子とステップ値でループ変数を1回進める
///
/// 型の範囲を越える場合は `None`。ステップ0や収束しない組み合わせは
/// 無限ループになるが、呼び出し側の責任とする。
pub fn advance<T: Steppable>(value: T, assignment: Assignment, step: T) -> Option<T> {
    value.checked_step(assignment, step)
}

/// ループを継続するかどうかを判定
pub fn test<T: Steppable>(value: T, relation: Relation, bound: T) -> bool {
    match relation {
        Relation::Equal => value == bound,
        Relation::NotEqual => value != bound,
        Relation::GreaterThan => value > bound,
        Relation::GreaterOrEqual => value >= bound,
        Relation::LessThan => value < bound,
        Relation::LessOrEqual => value <= bound,
    }
}
