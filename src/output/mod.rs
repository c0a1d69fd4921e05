//! Output Module
//!
//! スケジューラー定義XMLの要素ツリーとシリアライズを提供するモジュール。

mod markup;

pub use markup::{Document, Element};
