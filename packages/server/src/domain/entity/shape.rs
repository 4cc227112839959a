//! Shape エンティティ: ボード上の描画オブジェクト

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{
    error::BoardError,
    value_object::{ShapeId, Timestamp, UserId},
};

/// 更新で使うフィールド → 値の map（`changes` と `oldValues`）
pub type ShapeChanges = Map<String, Value>;

/// クライアントが指定しない場合のレイヤー
pub const DEFAULT_LAYER: &str = "default";

/// 図形を識別するため更新で変更できないフィールド
const IMMUTABLE_FIELDS: [&str; 4] = ["id", "type", "createdBy", "createdAt"];

fn default_layer() -> String {
    DEFAULT_LAYER.to_string()
}

/// ボード座標の点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// 図形の種類ごとの形状・内容フィールド
///
/// 図形と同じ階層にエンコードし、`type` フィールドで区別します。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    Path {
        points: Vec<Point>,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
}

/// 図形の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Path,
    Rect,
    Circle,
    Text,
}

impl Geometry {
    pub fn shape_type(&self) -> ShapeType {
        match self {
            Geometry::Path { .. } => ShapeType::Path,
            Geometry::Rect { .. } => ShapeType::Rect,
            Geometry::Circle { .. } => ShapeType::Circle,
            Geometry::Text { .. } => ShapeType::Text,
        }
    }
}

/// 描画オブジェクト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    #[serde(flatten)]
    pub geometry: Geometry,
    pub color: String,
    pub stroke_width: f64,
    #[serde(default = "default_layer")]
    pub layer: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

impl Shape {
    pub fn shape_type(&self) -> ShapeType {
        self.geometry.shape_type()
    }

    /// フィールド単位で更新し、`changes` に含まれるフィールドの更新前の値を返す
    ///
    /// `null` はフィールドの削除を意味し、既定値のあるフィールドにだけ使えます。
    /// 更新前に無かったフィールドは `null` として返します。
    /// エラー時は図形を変更しません。
    pub fn apply_changes(&mut self, changes: &ShapeChanges) -> Result<ShapeChanges, BoardError> {
        if let Some(field) = changes
            .keys()
            .find(|field| IMMUTABLE_FIELDS.contains(&field.as_str()))
        {
            return Err(BoardError::ImmutableField(field.clone()));
        }

        let mut encoded = self.encode()?;
        let mut old_values = ShapeChanges::new();
        for (field, value) in changes {
            old_values.insert(
                field.clone(),
                encoded.get(field).cloned().unwrap_or(Value::Null),
            );
            if value.is_null() {
                encoded.remove(field);
            } else {
                encoded.insert(field.clone(), value.clone());
            }
        }

        let updated: Shape = serde_json::from_value(Value::Object(encoded))
            .map_err(|e| BoardError::InvalidChange(e.to_string()))?;

        // 図形の種類に無いフィールドはデコード時に捨てられる
        let reencoded = updated.encode()?;
        for (field, value) in changes {
            let applied = match reencoded.get(field) {
                Some(current) => value.is_null() || same_value(current, value),
                None => value.is_null(),
            };
            if !applied {
                return Err(BoardError::InvalidChange(format!(
                    "field '{}' does not apply to a {:?} shape",
                    field,
                    updated.shape_type()
                )));
            }
        }

        *self = updated;
        Ok(old_values)
    }

    fn encode(&self) -> Result<ShapeChanges, BoardError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(BoardError::InvalidChange(format!(
                "shape encoded as {other}"
            ))),
            Err(e) => Err(BoardError::InvalidChange(e.to_string())),
        }
    }
}

/// `5` と `5.0` を同じ数として扱う構造比較
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same_value(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| same_value(x, y)))
        }
        _ => a == b,
    }
}
