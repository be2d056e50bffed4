//! Card commands

mod add;
mod delete;
mod mv;
mod update;

pub use add::AddCard;
pub use delete::DeleteCard;
pub use mv::MoveCard;
pub use update::UpdateCard;

use crate::engine::RemoteWrite;
use crate::types::{Card, CardId, CardPatch};

/// Position updates for renumbered siblings, skipping the card the user moved
fn renumber_writes<'a>(
    changed: impl IntoIterator<Item = &'a Card>,
    moved: &CardId,
) -> Vec<RemoteWrite> {
    changed
        .into_iter()
        .filter(|card| &card.id != moved)
        .map(|card| RemoteWrite::UpdateCard {
            id: card.id.clone(),
            patch: CardPatch::position(card.position),
        })
        .collect()
}
