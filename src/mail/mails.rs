use crate::models::{settingsmodel::AppSettings, submissionmodel::Submission};

pub struct Mail {
    pub subject: String,
    pub body: String,
}

pub fn new_submission_mail(settings: &AppSettings, reviewer_name: &str, submission: &Submission) -> Mail {
    let subject = format!("New submission: {} by {}", submission.song_title, submission.artist_name);
    let body = format!(
        "<p>Hi {reviewer},</p>\
         <p>A new track is waiting for your review on {platform}.</p>\
         <ul><li>Artist: {artist}</li><li>Song: {song}</li><li>Genre: {genre}</li></ul>\
         <p>Questions? Contact {support}.</p>",
        reviewer = html_escape(reviewer_name),
        platform = html_escape(&settings.platform_name),
        artist = html_escape(&submission.artist_name),
        song = html_escape(&submission.song_title),
        genre = html_escape(&submission.genre),
        support = html_escape(&settings.support_email),
    );

    Mail { subject, body }
}

pub fn review_ready_mail(settings: &AppSettings, submission: &Submission, review_url: &str) -> Mail {
    let subject = format!("Your review for \"{}\" is ready", submission.song_title);
    let body = format!(
        "<p>Hi {artist},</p>\
         <p>Your review on {platform} is ready.</p>\
         <p><a href=\"{url}\">Read your review</a></p>\
         <p>Keep this link private; anyone holding it can read the review.</p>",
        artist = html_escape(&submission.artist_name),
        platform = html_escape(&settings.platform_name),
        url = html_escape(review_url),
    );

    Mail { subject, body }
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>\"A&B\"</b>"), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
    }
}
