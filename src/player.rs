// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use crate::channel::Channel;
use crate::config::PlayerConfig;
use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

/// Hands stream urls to an external media player.
#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.config.command);

        for arg in &self.config.args {
            cmd.arg(arg);
        }

        cmd.arg(url);
        cmd
    }

    pub fn command_name(&self) -> &str {
        &self.config.command
    }

    /// Whether the configured player can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.config.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    /// Plays in the foreground and waits for the player to exit.
    pub fn play(&self, channel: &Channel) -> Result<()> {
        let url = channel
            .playable_url()
            .ok_or_else(|| anyhow::anyhow!("{} has no stream url", channel.display_name()))?;

        info!("Starting player: {} {}", self.config.command, url);

        let status = self.command(&url).status().with_context(|| {
            format!("Failed to execute player command: {}", self.config.command)
        })?;

        if !status.success() {
            return Err(anyhow::anyhow!(
                "Player process failed with exit code: {}",
                status
            ));
        }

        debug!("Player exited successfully");
        Ok(())
    }

    /// Starts the player detached from the terminal and returns immediately.
    pub fn play_detached(&self, channel: &Channel) -> Result<()> {
        let url = channel
            .playable_url()
            .ok_or_else(|| anyhow::anyhow!("{} has no stream url", channel.display_name()))?;

        let mut cmd = self.command(&url);
        cmd.stdout(Stdio::null())
            .stderr(Stdio::null())
            .stdin(Stdio::null());

        cmd.spawn().with_context(|| {
            format!(
                "Failed to start player in background: {}",
                self.config.command
            )
        })?;

        info!("Playing {} in background", channel.display_name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let player = Player::new(PlayerConfig {
            command: "mpv".to_string(),
            args: vec!["--fs".to_string()],
        });
        let cmd = player.command("http://a");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(cmd.get_program(), "mpv");
        assert_eq!(args, vec!["--fs", "http://a"]);
    }

    #[test]
    fn test_missing_player_is_unavailable() {
        let player = Player::new(PlayerConfig {
            command: "worldtv-no-such-player".to_string(),
            args: Vec::new(),
        });
        assert!(!player.is_available());
        assert_eq!(player.command_name(), "worldtv-no-such-player");
    }

    #[test]
    fn test_channel_without_url_is_refused() {
        let player = Player::new(PlayerConfig::default());
        let mut channel = Channel::new("FR", "Silent", "");
        channel.url = None;
        assert!(player.play(&channel).is_err());
        assert!(player.play_detached(&channel).is_err());
    }
}
