//! 値オブジェクト定義
//!
//! クライアントから届く ID は任意の文字列なので、境界で一度だけ検証し、
//! 以降は専用の型として扱います。

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

/// クライアントが指定する ID の最大長
pub const MAX_ID_LENGTH: usize = 128;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                if value.trim().is_empty() {
                    return Err(ValueObjectError::Empty($label));
                }
                if value.len() > MAX_ID_LENGTH {
                    return Err(ValueObjectError::TooLong($label, MAX_ID_LENGTH));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// ボード（共有ドキュメント）の ID
    BoardId,
    "board id"
);

string_id!(
    /// クライアントが指定する図形の ID（ボード内で一意）
    ///
    /// ロック対象は図形なので、ロックのキーも兼ねます。
    ShapeId,
    "shape id"
);

string_id!(
    /// 認証で得られる利用者 ID
    UserId,
    "user id"
);

impl UserId {
    /// 未認証の接続に割り当てるゲスト ID
    pub fn guest(connection_id: &ConnectionId) -> Self {
        Self(format!("guest-{}", connection_id.short()))
    }
}

/// WebSocket 接続 1 本ごとの一時的な ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// ゲスト ID の生成に使う短い接頭辞
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix タイムスタンプ（ミリ秒, UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// `self` から `later` までの経過ミリ秒（`later` が過去なら負）
    pub fn elapsed_until(&self, later: Timestamp) -> i64 {
        later.0 - self.0
    }
}
