// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use worldtv::Selection;
use worldtv::favourites::{Direction, FavouriteEntry};

pub enum FavoritesCommand {
    List,
    Add { code: String, slug: String },
    Remove { id: String },
    Folder { name: String },
    Rename { id: String, name: String },
    Move { id: String, folder: Option<String> },
    Up { id: String },
    Down { id: String },
    Play { id: String, detach: bool },
}

impl FavoritesCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        match self {
            Self::List => {
                let tree = context.browser.favourites().tree();
                if tree.is_empty() {
                    println!("No favourites found");
                }
                for row in tree.rows() {
                    let indent = "  ".repeat(row.depth);
                    match row.entry {
                        FavouriteEntry::Folder(folder) => {
                            println!("{}[{}] {}/", indent, folder.id, folder.name)
                        }
                        FavouriteEntry::Channel(channel) => println!(
                            "{}[{}] {} ({})",
                            indent,
                            channel.id,
                            channel.name,
                            channel.key()
                        ),
                    }
                }
            }
            Self::Add { code, slug } => {
                context.load(Selection::Country(code.clone())).await;
                let Some(channel) = context.browser.resolve(&code, &slug).cloned() else {
                    println!("{}/{} is no longer available", code.to_uppercase(), slug);
                    return Ok(());
                };

                if context.browser.add_favourite(&channel)? {
                    println!("Added '{}' to favourites", channel.display_name());
                } else {
                    println!("'{}' is already a favourite", channel.display_name());
                }
            }
            Self::Remove { id } => {
                report(context.browser.favourites_mut().remove(&id)?, "Removed", &id);
            }
            Self::Folder { name } => {
                let id = context.browser.favourites_mut().add_folder(&name)?;
                println!("Created folder '{}' [{}]", name, id);
            }
            Self::Rename { id, name } => {
                let renamed = context.browser.favourites_mut().rename_folder(&id, &name)?;
                report(renamed, "Renamed folder", &id);
            }
            Self::Move { id, folder } => {
                let store = context.browser.favourites_mut();
                let moved = match &folder {
                    Some(folder_id) => store.move_to_folder(&id, folder_id)?,
                    None => store.move_to_top_level(&id)?,
                };
                report(moved, "Moved", &id);
            }
            Self::Up { id } => {
                let moved = context
                    .browser
                    .favourites_mut()
                    .move_up_down(&id, Direction::Up)?;
                report(moved, "Moved up", &id);
            }
            Self::Down { id } => {
                let moved = context
                    .browser
                    .favourites_mut()
                    .move_up_down(&id, Direction::Down)?;
                report(moved, "Moved down", &id);
            }
            Self::Play { id, detach } => {
                let tree = context.browser.favourites().tree();
                let Some(FavouriteEntry::Channel(entry)) = tree.find(&id).cloned() else {
                    anyhow::bail!("Favourite {} not found", id);
                };

                match context.browser.resolve_favourite(&entry).await {
                    Some(channel) => context.play(&channel, detach),
                    None => println!("'{}' is no longer available", entry.name),
                }
            }
        }

        Ok(())
    }
}

fn report(changed: bool, action: &str, id: &str) {
    if changed {
        println!("{} {}", action, id);
    } else {
        println!("Nothing changed for {}", id);
    }
}
