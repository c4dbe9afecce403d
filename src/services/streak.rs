//! Writing-streak maintenance over a single streak record.
//!
//! Entry creation uses the O(1) incremental transition in [`advance`]; entry
//! deletion falls back to the O(n) authoritative pass in
//! [`recompute_from_dates`], because removing an arbitrary date can break the
//! incremental invariant in ways a local patch cannot repair. Both run inside
//! the caller's transaction so an entry write and its streak mutation are
//! observed atomically.

use chrono::NaiveDate;
use sqlx::PgConnection;

use crate::models::streak::Streak;

/// Incremental transition applied when an entry is created on `date`.
/// Returns the new `(current, longest, last_entry_date)`, or `None` when the
/// record must not be touched at all.
///
/// Incremental maintenance assumes entries arrive in non-decreasing date
/// order: a backfilled date at or before `last` mutates nothing (not even
/// `updated_at`), and `last_entry_date` never moves backward.
pub fn advance(
    current: i32,
    longest: i32,
    last: Option<NaiveDate>,
    date: NaiveDate,
) -> Option<(i32, i32, NaiveDate)> {
    let Some(last) = last else {
        return Some((1, longest.max(1), date));
    };

    let gap = (date - last).num_days();
    if gap == 1 {
        let current = current + 1;
        Some((current, longest.max(current), date))
    } else if gap > 1 {
        // Streak broken; longest is unaffected.
        Some((1, longest, date))
    } else {
        None
    }
}

/// Authoritative recomputation over the full entry-date history. Returns
/// `None` for an empty history, otherwise `(current, longest, latest_date)`.
/// Input order and duplicates are irrelevant.
pub fn recompute_from_dates(dates: &[NaiveDate]) -> Option<(i32, i32, NaiveDate)> {
    let mut dates = dates.to_vec();
    dates.sort_unstable();
    dates.dedup();
    let last = *dates.last()?;

    let mut current = 1;
    let mut longest = 1;
    for pair in dates.windows(2) {
        if (pair[1] - pair[0]).num_days() == 1 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 1;
        }
    }
    Some((current, longest, last))
}

/// Staleness projection applied on read: a last entry more than one day ago
/// means the user missed a day, so the reported current streak is 0. The
/// stored record is left as-is.
pub fn effective_current(current: i32, last: Option<NaiveDate>, today: NaiveDate) -> i32 {
    match last {
        Some(last) if (today - last).num_days() > 1 => 0,
        _ => current,
    }
}

async fn load(conn: &mut PgConnection) -> Result<Option<Streak>, sqlx::Error> {
    sqlx::query_as::<_, Streak>("SELECT * FROM streaks ORDER BY id LIMIT 1")
        .fetch_optional(conn)
        .await
}

/// O(1) streak maintenance invoked after an entry insert, within the same
/// transaction as the insert.
pub async fn on_entry_created(conn: &mut PgConnection, date: NaiveDate) -> Result<(), sqlx::Error> {
    match load(&mut *conn).await? {
        None => {
            sqlx::query(
                r#"
                INSERT INTO streaks (current_streak, longest_streak, last_entry_date)
                VALUES (1, 1, $1)
                "#,
            )
            .bind(date)
            .execute(&mut *conn)
            .await?;
        }
        Some(streak) => {
            let Some((current, longest, last)) = advance(
                streak.current_streak,
                streak.longest_streak,
                streak.last_entry_date,
                date,
            ) else {
                // Out-of-order backfill: the record stays exactly as stored.
                return Ok(());
            };
            sqlx::query(
                r#"
                UPDATE streaks SET
                    current_streak = $2,
                    longest_streak = $3,
                    last_entry_date = $4,
                    updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(streak.id)
            .bind(current)
            .bind(longest)
            .bind(last)
            .execute(&mut *conn)
            .await?;
        }
    }
    Ok(())
}

/// O(n) authoritative recompute invoked after an entry delete, within the
/// same transaction as the delete. With no entries left, the current streak
/// drops to 0 and the last entry date is cleared; the stored longest streak
/// is kept as a lifetime high-water mark.
pub async fn recompute_from_history(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    let dates =
        sqlx::query_scalar::<_, NaiveDate>("SELECT entry_date FROM entries ORDER BY entry_date")
            .fetch_all(&mut *conn)
            .await?;

    match recompute_from_dates(&dates) {
        None => {
            sqlx::query(
                r#"
                UPDATE streaks SET
                    current_streak = 0,
                    last_entry_date = NULL,
                    updated_at = now()
                "#,
            )
            .execute(&mut *conn)
            .await?;
        }
        Some((current, longest, last)) => {
            let existing = load(&mut *conn).await?;
            match existing {
                Some(streak) => {
                    sqlx::query(
                        r#"
                        UPDATE streaks SET
                            current_streak = $2,
                            longest_streak = $3,
                            last_entry_date = $4,
                            updated_at = now()
                        WHERE id = $1
                        "#,
                    )
                    .bind(streak.id)
                    .bind(current)
                    .bind(longest)
                    .bind(last)
                    .execute(&mut *conn)
                    .await?;
                }
                None => {
                    sqlx::query(
                        r#"
                        INSERT INTO streaks (current_streak, longest_streak, last_entry_date)
                        VALUES ($1, $2, $3)
                        "#,
                    )
                    .bind(current)
                    .bind(longest)
                    .bind(last)
                    .execute(&mut *conn)
                    .await?;
                }
            }
        }
    }
    Ok(())
}

/// Fetch the streak record, creating the zeroed row on first read.
pub async fn read_or_init(conn: &mut PgConnection) -> Result<Streak, sqlx::Error> {
    if let Some(streak) = load(&mut *conn).await? {
        return Ok(streak);
    }
    sqlx::query_as::<_, Streak>(
        r#"
        INSERT INTO streaks (current_streak, longest_streak)
        VALUES (0, 0)
        RETURNING *
        "#,
    )
    .fetch_one(&mut *conn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn first_entry_starts_streak() {
        assert_eq!(
            advance(0, 0, None, d("2024-01-01")),
            Some((1, 1, d("2024-01-01")))
        );
    }

    #[test]
    fn consecutive_day_extends_and_tracks_longest() {
        assert_eq!(
            advance(3, 3, Some(d("2024-01-03")), d("2024-01-04")),
            Some((4, 4, d("2024-01-04")))
        );
    }

    #[test]
    fn gap_resets_current_but_not_longest() {
        assert_eq!(
            advance(3, 3, Some(d("2024-01-03")), d("2024-01-05")),
            Some((1, 3, d("2024-01-05")))
        );
    }

    #[test]
    fn backfill_leaves_the_record_completely_untouched() {
        // A transition of None means no write happens at all, so a no-op
        // backfill cannot bump updated_at or regress last_entry_date.
        assert_eq!(advance(2, 5, Some(d("2024-01-02")), d("2024-01-02")), None);
        assert_eq!(advance(2, 5, Some(d("2024-01-02")), d("2023-12-25")), None);
    }

    #[test]
    fn incremental_agrees_with_recompute_for_gapless_ascending_inserts() {
        let dates: Vec<NaiveDate> = (1..=9).map(|i| d(&format!("2024-03-0{i}"))).collect();

        let mut current = 0;
        let mut longest = 0;
        let mut last = None;
        for &date in &dates {
            let (c, l, la) = advance(current, longest, last, date).unwrap();
            current = c;
            longest = l;
            last = Some(la);
        }

        let (rc, rl, rlast) = recompute_from_dates(&dates).unwrap();
        assert_eq!((current, longest, last), (rc, rl, Some(rlast)));
    }

    #[test]
    fn recompute_is_idempotent_and_order_insensitive() {
        let dates = vec![
            d("2024-01-05"),
            d("2024-01-01"),
            d("2024-01-02"),
            d("2024-01-02"),
        ];
        let first = recompute_from_dates(&dates);
        assert_eq!(first, recompute_from_dates(&dates));
        assert_eq!(first, Some((1, 2, d("2024-01-05"))));
    }

    #[test]
    fn recompute_of_empty_history_is_none() {
        assert_eq!(recompute_from_dates(&[]), None);
    }

    #[test]
    fn single_date_is_a_streak_of_one() {
        assert_eq!(
            recompute_from_dates(&[d("2024-06-15")]),
            Some((1, 1, d("2024-06-15")))
        );
    }

    #[test]
    fn delete_scenario_from_three_day_run() {
        // 01-01..01-03 inserted, then 01-05 (gap), then 01-03 deleted.
        let mut current = 0;
        let mut longest = 0;
        let mut last = None;
        for date in ["2024-01-01", "2024-01-02", "2024-01-03"] {
            let (c, l, la) = advance(current, longest, last, d(date)).unwrap();
            current = c;
            longest = l;
            last = Some(la);
        }
        assert_eq!((current, longest), (3, 3));

        let (c, l, la) = advance(current, longest, last, d("2024-01-05")).unwrap();
        assert_eq!((c, l, la), (1, 3, d("2024-01-05")));

        let remaining = vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-05")];
        assert_eq!(
            recompute_from_dates(&remaining),
            Some((1, 2, d("2024-01-05")))
        );
    }

    #[test]
    fn staleness_projection() {
        let today = d("2024-02-10");
        // Wrote yesterday: streak stands.
        assert_eq!(effective_current(4, Some(d("2024-02-09")), today), 4);
        // Wrote today: streak stands.
        assert_eq!(effective_current(4, Some(d("2024-02-10")), today), 4);
        // Missed a day: reported as 0.
        assert_eq!(effective_current(4, Some(d("2024-02-08")), today), 0);
        // No entries yet.
        assert_eq!(effective_current(0, None, today), 0);
    }
}
