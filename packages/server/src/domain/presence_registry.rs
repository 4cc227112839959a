//! Presence Registry: ボードごとの接続 → 利用者・カーソル情報
//!
//! ベストエフォートのメモリ上の状態です。1 つの接続が同時に参加できる
//! ボードは 1 つだけです。

use std::collections::{BTreeMap, HashMap};

use super::{
    authenticator::Identity,
    entity::{Cursor, PresenceEntry},
    value_object::{BoardId, ConnectionId},
};

/// 参加した接続に割り当てるカーソル色
pub const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#9a6324",
];

/// [`PresenceRegistry::join`] の結果
#[derive(Debug, Clone, PartialEq)]
pub struct Joined {
    pub entry: PresenceEntry,
    /// 直前に参加していたボードから取り除いたエントリ
    pub left: Option<(BoardId, PresenceEntry)>,
}

#[derive(Debug, Default)]
pub struct PresenceRegistry {
    boards: HashMap<BoardId, BTreeMap<ConnectionId, PresenceEntry>>,
    memberships: HashMap<ConnectionId, BoardId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// `connection_id` を `board_id` に登録する
    ///
    /// パレットの色を割り当て、カーソルを原点に置きます。別のボードに
    /// 参加していた場合は先にそこから退出します。
    pub fn join(
        &mut self,
        board_id: &BoardId,
        connection_id: ConnectionId,
        identity: &Identity,
    ) -> Joined {
        let left = self
            .memberships
            .get(&connection_id)
            .cloned()
            .and_then(|prior| {
                self.leave(&prior, &connection_id)
                    .map(|entry| (prior, entry))
            });

        let entry = PresenceEntry {
            connection_id,
            user_id: identity.user_id.clone(),
            display_name: identity.display_name.clone(),
            color: pick_color(&connection_id).to_string(),
            cursor: Cursor::default(),
        };
        self.boards
            .entry(board_id.clone())
            .or_default()
            .insert(connection_id, entry.clone());
        self.memberships.insert(connection_id, board_id.clone());

        Joined { entry, left }
    }

    /// `connection_id` を `board_id` から取り除く
    pub fn leave(
        &mut self,
        board_id: &BoardId,
        connection_id: &ConnectionId,
    ) -> Option<PresenceEntry> {
        let entries = self.boards.get_mut(board_id)?;
        let removed = entries.remove(connection_id)?;
        if entries.is_empty() {
            self.boards.remove(board_id);
        }
        if self.memberships.get(connection_id) == Some(board_id) {
            self.memberships.remove(connection_id);
        }
        Some(removed)
    }

    /// カーソル位置を記録する
    ///
    /// 接続がボードにいなければ `None` を返します。
    pub fn update_cursor(
        &mut self,
        board_id: &BoardId,
        connection_id: &ConnectionId,
        x: f64,
        y: f64,
    ) -> Option<PresenceEntry> {
        let entry = self.boards.get_mut(board_id)?.get_mut(connection_id)?;
        entry.cursor = Cursor { x, y };
        Some(entry.clone())
    }

    /// `board_id` の参加者一覧（接続 ID 順）
    pub fn snapshot(&self, board_id: &BoardId) -> Vec<PresenceEntry> {
        self.boards
            .get(board_id)
            .map(|entries| entries.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn board_of(&self, connection_id: &ConnectionId) -> Option<&BoardId> {
        self.memberships.get(connection_id)
    }
}

fn pick_color(connection_id: &ConnectionId) -> &'static str {
    // v4 の ID はランダムなので色も擬似ランダムに散らばる
    let index = (connection_id.as_uuid().as_u128() % PALETTE.len() as u128) as usize;
    PALETTE[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::UserId;

    fn board(id: &str) -> BoardId {
        BoardId::new(id.to_string()).unwrap()
    }

    fn identity(user: &str) -> Identity {
        Identity::authenticated(
            UserId::new(user.to_string()).unwrap(),
            user.to_uppercase(),
            None,
        )
    }

    #[test]
    fn test_join_assigns_palette_color_and_origin_cursor() {
        // テスト項目: join でパレットの色と原点のカーソルが割り当てられる
        // given (前提条件):
        let mut registry = PresenceRegistry::new();
        let connection = ConnectionId::generate();

        // when (操作):
        let joined = registry.join(&board("b1"), connection, &identity("alice"));

        // then (期待する結果):
        assert!(PALETTE.contains(&joined.entry.color.as_str()));
        assert_eq!(joined.entry.cursor, Cursor::default());
        assert_eq!(joined.entry.display_name, "ALICE");
        assert_eq!(joined.left, None);
        assert_eq!(registry.snapshot(&board("b1")), vec![joined.entry]);
    }

    #[test]
    fn test_join_other_board_leaves_prior_board() {
        // テスト項目: 別のボードへの join は前のボードからの暗黙の leave を伴う
        // given (前提条件):
        let mut registry = PresenceRegistry::new();
        let connection = ConnectionId::generate();
        registry.join(&board("b1"), connection, &identity("alice"));

        // when (操作):
        let joined = registry.join(&board("b2"), connection, &identity("alice"));

        // then (期待する結果):
        let (prior, entry) = joined.left.unwrap();
        assert_eq!(prior, board("b1"));
        assert_eq!(entry.connection_id, connection);
        assert!(registry.snapshot(&board("b1")).is_empty());
        assert_eq!(registry.snapshot(&board("b2")).len(), 1);
        assert_eq!(registry.board_of(&connection), Some(&board("b2")));
    }

    #[test]
    fn test_update_cursor() {
        // テスト項目: カーソル位置が更新される
        // given (前提条件):
        let mut registry = PresenceRegistry::new();
        let connection = ConnectionId::generate();
        registry.join(&board("b1"), connection, &identity("alice"));

        // when (操作):
        let updated = registry.update_cursor(&board("b1"), &connection, 12.5, -3.0);

        // then (期待する結果):
        assert_eq!(updated.unwrap().cursor, Cursor { x: 12.5, y: -3.0 });
        assert_eq!(
            registry.snapshot(&board("b1"))[0].cursor,
            Cursor { x: 12.5, y: -3.0 }
        );
    }

    #[test]
    fn test_update_cursor_on_other_board_is_ignored() {
        // テスト項目: 参加していないボードへのカーソル更新は無視される
        // given (前提条件):
        let mut registry = PresenceRegistry::new();
        let connection = ConnectionId::generate();
        registry.join(&board("b1"), connection, &identity("alice"));

        // when (操作):
        let updated = registry.update_cursor(&board("b2"), &connection, 1.0, 1.0);

        // then (期待する結果):
        assert_eq!(updated, None);
    }

    #[test]
    fn test_leave_removes_entry_once() {
        // テスト項目: leave はエントリを一度だけ削除する
        // given (前提条件):
        let mut registry = PresenceRegistry::new();
        let connection = ConnectionId::generate();
        registry.join(&board("b1"), connection, &identity("alice"));

        // when (操作):
        let first = registry.leave(&board("b1"), &connection);
        let second = registry.leave(&board("b1"), &connection);

        // then (期待する結果):
        assert!(first.is_some());
        assert_eq!(second, None);
        assert_eq!(registry.board_of(&connection), None);
    }

    #[test]
    fn test_colors_may_repeat_beyond_palette_size() {
        // テスト項目: パレットより多い参加者でも join でき、色の重複は許容される
        // given (前提条件):
        let mut registry = PresenceRegistry::new();

        // when (操作):
        for _ in 0..(PALETTE.len() * 2) {
            registry.join(&board("b1"), ConnectionId::generate(), &identity("guest"));
        }

        // then (期待する結果):
        assert_eq!(registry.snapshot(&board("b1")).len(), PALETTE.len() * 2);
    }
}
