use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "minaret", version, author, about = "Your mosque's prayer times, adhan and weather in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show today's prayer times and countdown to the next prayer
    Times,
    /// Fetch prayer times and weather now, ignoring the refresh schedule
    Fetch,
    /// Show current weather
    Weather,
    /// Automatic adhan settings
    Adhan {
        #[command(subcommand)]
        action: AdhanCommands,
    },
    /// Show or create the configuration file
    Config {
        /// Write a config file with default values
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdhanCommands {
    /// Show which prayers play the adhan automatically
    List,
    /// Switch the automatic adhan on or off for one prayer
    Toggle {
        /// Prayer name (fajr, sunrise, zuhr/dhuhr, asr, maghrib, isha)
        prayer: String,
    },
    /// Play the adhan now and wait for it to finish
    Test,
    /// Allow today's automatic adhans to play again
    StopMarkerReset,
}
