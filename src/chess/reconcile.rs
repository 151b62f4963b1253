use super::{
    GameRecord, StorageError,
    dates::normalize_event_date,
    store::{EventKey, GameKey, GameStore, StoredGame},
};
use tracing::{debug, info, warn};

/// Counts of what one reconciliation run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub games_inserted: usize,
    pub games_updated: usize,
    pub games_unchanged: usize,
    pub players_created: usize,
    pub players_raised: usize,
    pub events_created: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GameOutcome {
    Inserted,
    Updated,
    Unchanged,
}

/// Persist `games` in order, resolving players and events and upserting each
/// game by `(round, white, black, event)`.
///
/// Each record runs in its own transaction. `on_progress` receives the
/// completed percentage after every record and reaches 100 on the last one.
/// The first storage failure rolls back the current record and aborts the run;
/// records committed before it stay applied.
pub fn reconcile<S, F>(
    games: &[GameRecord],
    store: &mut S,
    mut on_progress: F,
) -> Result<ReconcileSummary, StorageError>
where
    S: GameStore + ?Sized,
    F: FnMut(u8),
{
    let mut summary = ReconcileSummary::default();
    let total = games.len();

    for (index, game) in games.iter().enumerate() {
        store.begin_record()?;
        let applied = reconcile_record(store, game, &mut summary).and_then(|outcome| {
            store.commit_record()?;
            Ok(outcome)
        });
        let outcome = match applied {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    record = index,
                    white = %game.white,
                    black = %game.black,
                    error = %err,
                    "Aborting upload"
                );
                if let Err(rollback_err) = store.rollback_record() {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(err);
            }
        };

        match outcome {
            GameOutcome::Inserted => summary.games_inserted += 1,
            GameOutcome::Updated => summary.games_updated += 1,
            GameOutcome::Unchanged => summary.games_unchanged += 1,
        }
        debug!(record = index, ?outcome, "Reconciled game");

        let completed = index + 1;
        on_progress((completed * 100 / total) as u8);
    }

    if total > 0 {
        info!(
            inserted = summary.games_inserted,
            updated = summary.games_updated,
            unchanged = summary.games_unchanged,
            "Upload complete"
        );
    }
    Ok(summary)
}

fn reconcile_record<S>(
    store: &mut S,
    game: &GameRecord,
    summary: &mut ReconcileSummary,
) -> Result<GameOutcome, StorageError>
where
    S: GameStore + ?Sized,
{
    let white_player_id = resolve_player(store, &game.white, game.white_elo, summary)?;
    let black_player_id = resolve_player(store, &game.black, game.black_elo, summary)?;
    let event_id = resolve_event(store, game, summary)?;

    let key = GameKey {
        round: game.round.clone(),
        white_player_id,
        black_player_id,
        event_id,
    };
    let incoming = StoredGame {
        result: game.result,
        moves: game.moves.clone(),
    };

    match store.find_game(&key)? {
        Some(existing) if existing == incoming => Ok(GameOutcome::Unchanged),
        Some(_) => {
            store.update_game(&key, &incoming)?;
            Ok(GameOutcome::Updated)
        }
        None => {
            store.insert_game(&key, &incoming)?;
            Ok(GameOutcome::Inserted)
        }
    }
}

/// Find a player by name, raising the stored elo if `elo` is higher, or
/// create the player.
fn resolve_player<S>(
    store: &mut S,
    name: &str,
    elo: u32,
    summary: &mut ReconcileSummary,
) -> Result<i64, StorageError>
where
    S: GameStore + ?Sized,
{
    match store.find_player(name)? {
        Some(player) => {
            if elo > player.elo {
                store.update_player_elo(player.id, elo)?;
                summary.players_raised += 1;
            }
            Ok(player.id)
        }
        None => {
            let id = store.insert_player(name, elo)?;
            summary.players_created += 1;
            Ok(id)
        }
    }
}

fn resolve_event<S>(
    store: &mut S,
    game: &GameRecord,
    summary: &mut ReconcileSummary,
) -> Result<i64, StorageError>
where
    S: GameStore + ?Sized,
{
    let key = EventKey {
        name: game.event_name.clone(),
        site: game.site.clone(),
        date: normalize_event_date(&game.event_date),
    };

    if let Some(id) = store.find_event(&key)? {
        return Ok(id);
    }
    let id = store.insert_event(&key)?;
    summary.events_created += 1;
    Ok(id)
}
