// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod channel;
pub mod config;
pub mod country;
pub mod favourites;
pub mod feed;
pub mod filter;
pub mod player;
pub mod resolve;
pub mod session;
pub mod source;
pub mod storage;
pub mod trash;

pub use channel::{Channel, ChannelKey, ChannelType};
pub use config::Config;
pub use favourites::FavouritesStore;
pub use feed::{FeedLoader, Selection};
pub use filter::ChannelFilter;
pub use player::Player;
pub use session::Browser;
pub use trash::TrashStore;
