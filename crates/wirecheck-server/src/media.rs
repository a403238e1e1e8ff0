//! Media file hosting for playback tests.
//!
//! The control plane fetches these URLs when executing a play instruction.
//! Files live in the configured media directory; the delayed variant holds
//! the response open before streaming to exercise the fetcher's timeout
//! tolerance.

use crate::responders::log_request;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

/// Delay applied by the delayed media host before streaming bytes.
const DELAYED_STREAM_DELAY: Duration = Duration::from_secs(5);

/// One hosted media fixture.
///
/// An enumerated type rather than a label-keyed map, so an unknown label is
/// a routing miss instead of a silent lookup failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avi,
    Mp3,
    DelayedMp3,
    Wav,
    Ogg,
    Mp4,
    Mov,
    Png,
    Tiff,
    Jpg,
    Pdf,
}

impl MediaKind {
    /// All hosted kinds, in route registration order.
    pub const ALL: &'static [MediaKind] = &[
        MediaKind::Avi,
        MediaKind::Mp3,
        MediaKind::DelayedMp3,
        MediaKind::Wav,
        MediaKind::Ogg,
        MediaKind::Mp4,
        MediaKind::Mov,
        MediaKind::Png,
        MediaKind::Tiff,
        MediaKind::Jpg,
        MediaKind::Pdf,
    ];

    /// Resolves a path label to a kind.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.label() == label)
    }

    /// The externally visible label under `/endpoints/media/`.
    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Avi => "avi",
            MediaKind::Mp3 => "mp3",
            MediaKind::DelayedMp3 => "delayed-mp3",
            MediaKind::Wav => "wav",
            MediaKind::Ogg => "ogg",
            MediaKind::Mp4 => "mp4",
            MediaKind::Mov => "mov",
            MediaKind::Png => "png",
            MediaKind::Tiff => "tiff",
            MediaKind::Jpg => "jpg",
            MediaKind::Pdf => "pdf",
        }
    }

    /// Fixture filename within the media directory.
    pub fn filename(self) -> &'static str {
        match self {
            MediaKind::Avi => "file_example_AVI_480_750kB.avi",
            MediaKind::Mp3 | MediaKind::DelayedMp3 => "file_example_MP3_1MG.mp3",
            MediaKind::Wav => "file_example_WAV_1MG.wav",
            MediaKind::Ogg => "file_example_OOG_1MG.ogg",
            MediaKind::Mp4 => "file_example_MP4_480_1_5MG.mp4",
            MediaKind::Mov => "file_example_MOV_480_700kB.mov",
            MediaKind::Png => "file_example_PNG_1MB.png",
            MediaKind::Tiff => "file_example_TIFF_1MB.tiff",
            MediaKind::Jpg => "file_example_JPG_1MB.jpg",
            MediaKind::Pdf => "file_example_PDF_1MB.pdf",
        }
    }

    /// Content type sent with the file bytes.
    ///
    /// Pdf deliberately claims `audio/mpeg3`: that test feeds the fetcher a
    /// mislabeled payload and watches what it does with it.
    pub fn content_type(self) -> &'static str {
        match self {
            MediaKind::Avi => "video/avi",
            MediaKind::Mp3 | MediaKind::DelayedMp3 => "audio/mpeg3",
            MediaKind::Wav => "audio/wav",
            MediaKind::Ogg => "audio/ogg",
            MediaKind::Mp4 => "video/mp4",
            MediaKind::Mov => "video/quicktime",
            MediaKind::Png => "image/png",
            MediaKind::Tiff => "image/tiff",
            MediaKind::Jpg => "image/jpg",
            MediaKind::Pdf => "audio/mpeg3",
        }
    }
}

/// Serves one media fixture by label.
pub async fn media_endpoint(
    State(state): State<Arc<AppState>>,
    Path(label): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    log_request(&method, &uri, &headers);

    let Some(kind) = MediaKind::from_label(&label) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if kind == MediaKind::DelayedMp3 {
        tokio::time::sleep(DELAYED_STREAM_DELAY).await;
    }

    let path = std::path::Path::new(&state.config.response.media_dir).join(kind.filename());
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, kind.content_type())],
            Body::from(bytes),
        )
            .into_response(),
        Err(err) => {
            error!(file = %path.display(), error = %err, "Media fixture unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_label_resolves_to_exactly_one_kind() {
        for kind in MediaKind::ALL {
            assert_eq!(MediaKind::from_label(kind.label()), Some(*kind));
        }
        assert_eq!(MediaKind::from_label("flac"), None);
    }

    #[test]
    fn delayed_mp3_shares_the_mp3_fixture() {
        assert_eq!(
            MediaKind::DelayedMp3.filename(),
            MediaKind::Mp3.filename()
        );
        assert_eq!(
            MediaKind::DelayedMp3.content_type(),
            MediaKind::Mp3.content_type()
        );
    }

    #[test]
    fn pdf_is_served_as_audio() {
        assert_eq!(MediaKind::Pdf.content_type(), "audio/mpeg3");
        assert!(MediaKind::Pdf.filename().ends_with(".pdf"));
    }
}
