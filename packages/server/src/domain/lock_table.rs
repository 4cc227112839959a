//! Lock Table: ボードごとの期限付き排他ロック（勧告的）
//!
//! タイムアウトを過ぎたロックは、定期掃除を待たずに参照した時点で無いものとして
//! 扱います。そうして取り除いたロックは保留され、次の
//! [`LockTable::expire_stale`] が返すため、期限切れはちょうど 1 回だけ報告されます。
//! ロックはプロセス内のメモリにだけ存在し、永続化しません。

use std::collections::BTreeMap;

use super::{
    entity::{Lock, LockHolder},
    value_object::{ConnectionId, ShapeId, Timestamp},
};

/// 設定が無い場合のロックの有効期間
pub const DEFAULT_LOCK_TIMEOUT_MILLIS: i64 = 30_000;

/// ロック取得の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// 要求元がロックを保持している（新規または取得済み）
    Granted(Lock),
    /// 他の接続が有効なロックを保持している
    Denied(LockHolder),
}

/// ロック解放の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    Released(Lock),
    /// 要求元が有効なロックを保持していない
    Noop,
}

#[derive(Debug, Clone)]
pub struct LockTable {
    locks: BTreeMap<ShapeId, Lock>,
    timeout_millis: i64,
    /// 参照時に取り除いたが、まだ `expire_stale` で返していないロック
    evicted: Vec<Lock>,
}

impl Default for LockTable {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_TIMEOUT_MILLIS)
    }
}

impl LockTable {
    pub fn new(timeout_millis: i64) -> Self {
        Self {
            locks: BTreeMap::new(),
            timeout_millis,
            evicted: Vec::new(),
        }
    }

    pub fn timeout_millis(&self) -> i64 {
        self.timeout_millis
    }

    /// `object_id` のロックを取得する
    ///
    /// 自分のロックの再取得は成功しますが、取得時刻は更新しないため
    /// 最初の期限で失効します。
    pub fn acquire(
        &mut self,
        object_id: &ShapeId,
        holder: LockHolder,
        now: Timestamp,
    ) -> AcquireOutcome {
        self.purge_if_stale(object_id, now);

        if let Some(existing) = self.locks.get(object_id) {
            if existing.holder.is_connection(&holder.connection_id) {
                return AcquireOutcome::Granted(existing.clone());
            }
            return AcquireOutcome::Denied(existing.holder.clone());
        }

        let lock = Lock {
            object_id: object_id.clone(),
            holder,
            acquired_at: now,
        };
        self.locks.insert(object_id.clone(), lock.clone());
        AcquireOutcome::Granted(lock)
    }

    /// `connection_id` が有効なロックを持っていれば `object_id` を解放する
    pub fn release(
        &mut self,
        object_id: &ShapeId,
        connection_id: &ConnectionId,
        now: Timestamp,
    ) -> ReleaseOutcome {
        self.purge_if_stale(object_id, now);

        let held = self
            .locks
            .get(object_id)
            .is_some_and(|lock| lock.holder.is_connection(connection_id));
        if !held {
            return ReleaseOutcome::Noop;
        }
        self.locks
            .remove(object_id)
            .map_or(ReleaseOutcome::Noop, ReleaseOutcome::Released)
    }

    /// `object_id` の現在の保持者
    pub fn holder_of(&mut self, object_id: &ShapeId, now: Timestamp) -> Option<LockHolder> {
        self.purge_if_stale(object_id, now);
        self.locks.get(object_id).map(|lock| lock.holder.clone())
    }

    /// `connection_id` が `object_id` を変更できるか確認する
    ///
    /// 他の接続が有効なロックを持っていれば、その保持者を返します。
    pub fn ensure_writable(
        &mut self,
        object_id: &ShapeId,
        connection_id: &ConnectionId,
        now: Timestamp,
    ) -> Result<(), LockHolder> {
        match self.holder_of(object_id, now) {
            Some(holder) if !holder.is_connection(connection_id) => Err(holder),
            _ => Ok(()),
        }
    }

    /// 期限切れのロックをすべて取り除いて返す
    ///
    /// 前回の呼び出し以降に参照時に取り除いたロックも含みます。
    pub fn expire_stale(&mut self, now: Timestamp) -> Vec<Lock> {
        let timeout = self.timeout_millis;
        let stale: Vec<ShapeId> = self
            .locks
            .values()
            .filter(|lock| lock.is_stale(now, timeout))
            .map(|lock| lock.object_id.clone())
            .collect();
        let mut expired = std::mem::take(&mut self.evicted);
        expired.extend(
            stale
                .iter()
                .filter_map(|object_id| self.locks.remove(object_id)),
        );
        expired
    }

    /// `connection_id` が持つロックをすべて解放して返す
    pub fn release_all(&mut self, connection_id: &ConnectionId) -> Vec<Lock> {
        let held: Vec<ShapeId> = self
            .locks
            .values()
            .filter(|lock| lock.holder.is_connection(connection_id))
            .map(|lock| lock.object_id.clone())
            .collect();
        held.iter()
            .filter_map(|object_id| self.locks.remove(object_id))
            .collect()
    }

    /// 有効なロックの一覧（オブジェクト ID 順）
    ///
    /// ここで見つけた期限切れロックは次の `expire_stale` まで保留します。
    pub fn active(&mut self, now: Timestamp) -> Vec<Lock> {
        self.evicted = self.expire_stale(now);
        self.locks.values().cloned().collect()
    }

    fn purge_if_stale(&mut self, object_id: &ShapeId, now: Timestamp) {
        let timeout = self.timeout_millis;
        if self
            .locks
            .get(object_id)
            .is_some_and(|lock| lock.is_stale(now, timeout))
            && let Some(lock) = self.locks.remove(object_id)
        {
            self.evicted.push(lock);
        }
    }
}
