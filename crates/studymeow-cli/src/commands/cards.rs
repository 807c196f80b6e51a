use clap::Subcommand;
use studymeow_core::{Difficulty, Rarity, Subject, Theme};

use super::{print_json, CmdResult, Workspace};

#[derive(Subcommand)]
pub enum CardsAction {
    /// List owned cards
    List {
        #[arg(long, conflicts_with_all = ["theme", "subject"])]
        rarity: Option<Rarity>,
        #[arg(long, conflicts_with = "subject")]
        theme: Option<Theme>,
        #[arg(long)]
        subject: Option<Subject>,
    },
    /// Collection progress against the catalog
    Progress,
    /// Every card that can drop
    Catalog,
    /// Roll for a card directly
    Roll {
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
        /// Completion ratio, capped at 1.5
        #[arg(long, default_value = "1.0")]
        ratio: f64,
    },
    /// Remove an owned card
    Remove {
        /// Card instance ID
        id: String,
    },
}

pub fn run(action: CardsAction) -> CmdResult {
    let mut ws = Workspace::open()?;

    match action {
        CardsAction::List {
            rarity,
            theme,
            subject,
        } => {
            let cards: Vec<_> = match (rarity, theme, subject) {
                (Some(r), _, _) => ws.engine.cards_by_rarity(r),
                (_, Some(t), _) => ws.engine.cards_by_theme(t),
                (_, _, Some(s)) => ws.engine.cards_by_subject(s),
                _ => ws.engine.collection().cards().iter().collect(),
            };
            print_json(&cards)?;
        }
        CardsAction::Progress => {
            print_json(&ws.engine.collection_progress())?;
        }
        CardsAction::Catalog => {
            print_json(ws.engine.catalog())?;
        }
        CardsAction::Roll { difficulty, ratio } => match ws.engine.roll_for_card(difficulty, ratio) {
            Some(acquisition) => print_json(&acquisition)?,
            None => print_json(&serde_json::json!({ "result": "none" }))?,
        },
        CardsAction::Remove { id } => {
            let card = ws.engine.remove_card(&id)?;
            println!("Card removed: {} ({})", card.name, card.id);
        }
    }

    ws.save()?;
    Ok(())
}
