//! Runner identity.
//!
//! # RunnerId
//! クラスタ内で一意な runner 名。master レコードの値としてのみストアへ送られます。
//!
//! ## なぜ空文字を拒否するのか？
//! ストアは「master なし」を空（`None`）で表現します。空文字の runner を許すと、
//! 空の master レコードを自分自身と区別できなくなります。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::IdentityError;

/// RunnerId は runner の一意な識別子
///
/// # 例
/// ```ignore
/// let id = RunnerId::new("worker-1")?;
/// assert_eq!(id.as_str(), "worker-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RunnerId(String);

impl RunnerId {
    /// 文字列から RunnerId を作成（空白のみの名前は拒否）
    pub fn new(name: impl Into<String>) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentityError::Empty);
        }
        Ok(Self(name))
    }

    /// 空でないことが呼び出し側で保証されている名前から作成
    pub(crate) fn from_non_empty(name: String) -> Self {
        debug_assert!(!name.trim().is_empty());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RunnerId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RunnerId {
    type Error = IdentityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for RunnerId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RunnerId> for String {
    fn from(id: RunnerId) -> Self {
        id.0
    }
}

impl AsRef<str> for RunnerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
