// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use worldtv::Selection;

pub enum TrashCommand {
    List,
    Add { code: String, slug: String },
    Restore { code: String, slug: String },
    Empty,
}

impl TrashCommand {
    pub async fn execute(self, mut context: CommandContext) -> Result<()> {
        match self {
            Self::List => {
                let entries = context.browser.trash().entries();
                if entries.is_empty() {
                    println!("Trash is empty");
                }
                for entry in entries {
                    println!("{:2} | {:32} | {}", entry.iso, entry.slug, entry.name);
                }
            }
            Self::Add { code, slug } => {
                context.load(Selection::Country(code.clone())).await;
                let Some(channel) = context.browser.resolve(&code, &slug).cloned() else {
                    println!("{}/{} is no longer available", code.to_uppercase(), slug);
                    return Ok(());
                };

                if context.browser.trash_channel(&channel)? {
                    println!("Moved '{}' to the trash", channel.display_name());
                } else {
                    println!("'{}' is already in the trash", channel.display_name());
                }
            }
            Self::Restore { code, slug } => {
                let iso = worldtv::country::canonical_code(&code).unwrap_or(code);
                if context.browser.restore_channel(&iso, &slug)? {
                    println!("Restored {}/{}", iso, slug);
                } else {
                    println!("{}/{} is not in the trash", iso, slug);
                }
            }
            Self::Empty => {
                if context.browser.empty_trash()? {
                    println!("Trash emptied");
                } else {
                    println!("Trash is already empty");
                }
            }
        }

        Ok(())
    }
}
