//! Badge rendering from a presence snapshot.
//!
//! Everything here is a pure function of `(profiles, snapshot)`; the view
//! never touches the store.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use encantia_common::UserId;
use tokio::sync::watch;
use tracing::debug;

use crate::reader::PresenceSnapshot;
use crate::record::ProfileRow;

/// Bucket for profiles without a role.
pub const NO_ROLE: &str = "No role";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    Online,
    Offline,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Online => "online",
            Badge::Offline => "offline",
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Badge::Online => '●',
            Badge::Offline => '○',
        }
    }
}

/// One rendered listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRow {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Option<String>,
    pub badge: Badge,
    pub last_seen_at: Option<DateTime<Utc>>,
}

/// Rows for `profiles`, online first, then by name (case-insensitive).
///
/// Users missing from the snapshot render offline.
pub fn render_rows(profiles: &[ProfileRow], snapshot: &PresenceSnapshot) -> Vec<BadgeRow> {
    let mut rows: Vec<BadgeRow> = profiles
        .iter()
        .map(|profile| {
            let status = snapshot.status(&profile.user_id);
            let online = status.is_some_and(|s| s.online);
            BadgeRow {
                user_id: profile.user_id.clone(),
                display_name: profile.display_name().to_string(),
                role: profile.role().map(str::to_string),
                badge: if online { Badge::Online } else { Badge::Offline },
                last_seen_at: status.and_then(|s| s.last_seen_at),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        let a_key = (a.badge != Badge::Online, a.display_name.to_lowercase());
        let b_key = (b.badge != Badge::Online, b.display_name.to_lowercase());
        a_key.cmp(&b_key).then_with(|| a.user_id.cmp(&b.user_id))
    });
    rows
}

/// Group rows by role, keeping the row order within each group.
pub fn group_by_role(rows: &[BadgeRow]) -> BTreeMap<String, Vec<BadgeRow>> {
    let mut groups: BTreeMap<String, Vec<BadgeRow>> = BTreeMap::new();
    for row in rows {
        let role = row.role.clone().unwrap_or_else(|| NO_ROLE.to_string());
        groups.entry(role).or_default().push(row.clone());
    }
    groups
}

/// Plain-text listing, one section per role.
pub fn render_text(rows: &[BadgeRow]) -> String {
    let online = rows.iter().filter(|r| r.badge == Badge::Online).count();
    let mut out = format!("{online}/{} online\n", rows.len());

    for (role, members) in group_by_role(rows) {
        let _ = writeln!(out, "\n{role}");
        for row in members {
            let _ = write!(out, "  {} {}", row.badge.symbol(), row.display_name);
            if let Some(seen) = row.last_seen_at {
                let _ = write!(out, "  (last seen {})", seen.format("%Y-%m-%d %H:%M:%S UTC"));
            }
            out.push('\n');
        }
    }
    out
}

/// Profile listing bound to a stream of snapshots.
#[derive(Debug, Clone, Default)]
pub struct PresenceView {
    profiles: Vec<ProfileRow>,
}

impl PresenceView {
    pub fn new(profiles: Vec<ProfileRow>) -> Self {
        Self { profiles }
    }

    pub fn profiles(&self) -> &[ProfileRow] {
        &self.profiles
    }

    /// User ids the view needs statuses for.
    pub fn user_ids(&self) -> Vec<UserId> {
        self.profiles.iter().map(|p| p.user_id.clone()).collect()
    }

    pub fn render(&self, snapshot: &PresenceSnapshot) -> Vec<BadgeRow> {
        render_rows(&self.profiles, snapshot)
    }

    /// Render the current snapshot, then again on every change, until the
    /// sender is dropped.
    pub async fn bind<F>(&self, mut rx: watch::Receiver<PresenceSnapshot>, mut on_render: F)
    where
        F: FnMut(Vec<BadgeRow>),
    {
        loop {
            let rows = {
                let snapshot = rx.borrow_and_update();
                self.render(&snapshot)
            };
            on_render(rows);

            if rx.changed().await.is_err() {
                debug!("Snapshot sender dropped, view unbound");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::reader::PresenceStatus;
    use crate::testing::t0;

    fn snapshot(online: &[&str], offline: &[&str]) -> PresenceSnapshot {
        let mut statuses = HashMap::new();
        for id in online {
            statuses.insert(
                UserId::new(*id),
                PresenceStatus {
                    online: true,
                    last_seen_at: Some(t0()),
                },
            );
        }
        for id in offline {
            statuses.insert(
                UserId::new(*id),
                PresenceStatus {
                    online: false,
                    last_seen_at: None,
                },
            );
        }
        PresenceSnapshot::new(statuses, t0(), 1)
    }

    fn profiles() -> Vec<ProfileRow> {
        vec![
            ProfileRow::new("u-1").with_name("zoe").with_role("Admin"),
            ProfileRow::new("u-2").with_name("Bruno"),
            ProfileRow::new("u-3").with_name("alba").with_role("Admin"),
            ProfileRow::new("u-4"),
        ]
    }

    #[test]
    fn online_rows_come_first_then_by_name() {
        let rows = render_rows(&profiles(), &snapshot(&["u-1", "u-4"], &["u-2"]));
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["u-4", "zoe", "alba", "Bruno"]);
        assert_eq!(rows[0].badge, Badge::Online);
        assert_eq!(rows[2].badge, Badge::Offline);
    }

    #[test]
    fn users_missing_from_snapshot_render_offline() {
        let rows = render_rows(&profiles(), &PresenceSnapshot::default());
        assert!(rows.iter().all(|r| r.badge == Badge::Offline));
        assert!(rows.iter().all(|r| r.last_seen_at.is_none()));
    }

    #[test]
    fn grouping_uses_no_role_bucket() {
        let rows = render_rows(&profiles(), &snapshot(&["u-3"], &[]));
        let groups = group_by_role(&rows);
        let keys: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Admin", NO_ROLE]);
        let admins: Vec<&str> = groups["Admin"].iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(admins, vec!["alba", "zoe"]);
    }

    #[test]
    fn text_listing() {
        let rows = render_rows(&profiles(), &snapshot(&["u-3"], &[]));
        let text = render_text(&rows);
        assert!(text.starts_with("1/4 online\n"));
        assert!(text.contains("Admin\n  ● alba  (last seen 2025-04-19 12:00:00 UTC)\n"));
        assert!(text.contains("  ○ zoe\n"));
        assert!(text.contains(NO_ROLE));
    }

    #[tokio::test]
    async fn bind_renders_on_each_change() {
        let view = PresenceView::new(profiles());
        let (tx, rx) = watch::channel(PresenceSnapshot::default());

        let task = tokio::spawn(async move {
            let mut renders = Vec::new();
            view.bind(rx, |rows| {
                renders.push(rows.iter().filter(|r| r.badge == Badge::Online).count())
            })
            .await;
            renders
        });

        tokio::task::yield_now().await;
        tx.send(snapshot(&["u-1", "u-2"], &[])).unwrap();
        tokio::task::yield_now().await;
        drop(tx);

        let renders = task.await.unwrap();
        assert!(renders.len() <= 2);
        assert_eq!(renders.last(), Some(&2));
    }
}
