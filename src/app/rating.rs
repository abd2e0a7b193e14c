// src/app/rating.rs
use eframe::egui as eg;

pub const DEFAULT_STAR_COLOR: eg::Color32 = eg::Color32::from_rgb(0xfc, 0xc4, 0x19);

/// Clickable row of stars. `rating` is committed; `hover_rating` only
/// previews and is cleared when the pointer leaves the row.
#[derive(Clone, Debug)]
pub struct StarRating {
    max_rating: u8,
    size: f32,
    color: eg::Color32,
    messages: Vec<String>,
    rating: u8,
    hover_rating: u8,
}

impl Default for StarRating {
    fn default() -> Self {
        Self::new(5)
    }
}

impl StarRating {
    pub fn new(max_rating: u8) -> Self {
        Self {
            max_rating: max_rating.max(1),
            size: 48.0,
            color: DEFAULT_STAR_COLOR,
            messages: Vec::new(),
            rating: 0,
            hover_rating: 0,
        }
    }

    pub fn size(mut self, size: f32) -> Self {
        self.size = size.max(8.0);
        self
    }

    pub fn color(mut self, color: eg::Color32) -> Self {
        self.color = color;
        self
    }

    pub fn messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages = messages.into_iter().map(Into::into).collect();
        self
    }

    pub fn default_rating(mut self, rating: u8) -> Self {
        self.rating = rating.min(self.max_rating);
        self
    }

    pub fn max_rating(&self) -> u8 {
        self.max_rating
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    /// What the stars currently show: the hover preview, else the commit.
    pub fn displayed(&self) -> u8 {
        if self.hover_rating > 0 {
            self.hover_rating
        } else {
            self.rating
        }
    }

    /// Text next to the stars. Messages are used only when there is one per star.
    pub fn label(&self) -> String {
        let shown = self.displayed();
        if shown == 0 {
            return String::new();
        }
        if self.messages.len() == self.max_rating as usize {
            self.messages[shown as usize - 1].clone()
        } else {
            shown.to_string()
        }
    }

    pub fn hover(&mut self, star: u8) {
        self.hover_rating = star.min(self.max_rating);
    }

    pub fn leave(&mut self) {
        self.hover_rating = 0;
    }

    /// Commit `star` and report it to the owner.
    pub fn click<F: FnOnce(u8)>(&mut self, star: u8, on_set_rating: F) {
        let star = star.clamp(1, self.max_rating);
        self.rating = star;
        on_set_rating(star);
    }

    pub fn show<F: FnOnce(u8)>(&mut self, ui: &mut eg::Ui, on_set_rating: F) -> eg::Response {
        let mut hovered: Option<u8> = None;
        let mut clicked: Option<u8> = None;
        let shown = self.displayed();

        let inner = ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 2.0;
            for star in 1..=self.max_rating {
                let (rect, resp) =
                    ui.allocate_exact_size(eg::vec2(self.size, self.size), eg::Sense::click());
                let glyph = if star <= shown { "★" } else { "☆" };
                ui.painter().text(
                    rect.center(),
                    eg::Align2::CENTER_CENTER,
                    glyph,
                    eg::FontId::proportional(self.size * 0.9),
                    self.color,
                );
                if resp.hovered() {
                    hovered = Some(star);
                }
                if resp.clicked() {
                    clicked = Some(star);
                }
            }
            ui.add_space(8.0);
            ui.label(
                eg::RichText::new(self.label())
                    .size(self.size / 1.5)
                    .color(self.color),
            );
        });

        match hovered {
            Some(star) => self.hover(star),
            None => self.leave(),
        }
        if let Some(star) = clicked {
            self.click(star, on_set_rating);
        }
        inner.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_commits_and_notifies() {
        let mut stars = StarRating::new(5);
        let mut got = 0;
        stars.click(3, |r| got = r);
        assert_eq!(stars.rating(), 3);
        assert_eq!(got, 3);
        assert_eq!(stars.displayed(), 3);
    }

    #[test]
    fn hover_then_leave_restores_commit() {
        let mut stars = StarRating::new(5);
        stars.hover(5);
        assert_eq!(stars.displayed(), 5);
        stars.leave();
        assert_eq!(stars.displayed(), 0);

        stars.click(2, |_| {});
        stars.hover(5);
        assert_eq!(stars.displayed(), 5);
        assert_eq!(stars.rating(), 2);
        stars.leave();
        assert_eq!(stars.displayed(), 2);
    }

    #[test]
    fn labels_fall_back_to_numbers() {
        let mut stars =
            StarRating::new(5).messages(["terrible", "bad", "okay", "good", "amazing"]);
        assert_eq!(stars.label(), "");
        stars.hover(4);
        assert_eq!(stars.label(), "good");

        let mut mismatched = StarRating::new(10).messages(["meh", "ok"]);
        mismatched.click(7, |_| {});
        assert_eq!(mismatched.label(), "7");
    }

    #[test]
    fn default_rating_is_clamped() {
        let stars = StarRating::new(5).default_rating(9);
        assert_eq!(stars.rating(), 5);
        assert_eq!(StarRating::default().default_rating(3).displayed(), 3);
    }
}
