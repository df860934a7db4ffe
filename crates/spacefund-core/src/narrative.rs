//! Narrative text shown on the story and end screens.

use spacefund_types::Screen;

/// Intro shown on the story screen.
pub const STORY: &str = "In the year 2157, humanity has pushed beyond the solar system.
You have been named commander of the survey vessel Odyssey.
Countless unknown worlds are waiting for you.
From now on, your choices decide the future of humankind.";

/// Shown when funds reach the target.
pub const VICTORY: &str = "Congratulations!
Your missions have raised an enormous fund.
Humanity can now reach further into space than ever before.
You will be remembered as the greatest explorer in history.";

/// Shown when the days run out first.
pub const DEFEAT: &str = "The mission period has ended.
The target fund was not reached.
Your effort was not in vain.
Better luck next time.";

/// Narrative for a screen, if it has one.
pub const fn text_for(screen: Screen) -> Option<&'static str> {
    match screen {
        Screen::Story => Some(STORY),
        Screen::Victory => Some(VICTORY),
        Screen::Defeat => Some(DEFEAT),
        Screen::Menu | Screen::Tutorial | Screen::Missions => None,
    }
}
