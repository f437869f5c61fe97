//! MIME type derivation
//!
//! Classifies a source file by its extension using the standard
//! extension table shipped with `mime_guess`.

/// Extracts the lowercase extension from a path or URL.
///
/// The fragment and query are ignored and only the last path segment is
/// considered, so `song.mp3?x=1` and `/a.b/track.MP3` both yield `mp3`.
pub fn extension_from_path(path: &str) -> Option<String> {
    let path = path.split('#').next().unwrap_or(path);
    let path = path.split('?').next().unwrap_or(path);
    let file_name = path.rsplit('/').next().unwrap_or(path);

    let (_, ext) = file_name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}

/// Looks up the MIME type for a path's extension, if the extension is known
pub fn mime_type_for_path(path: &str) -> Option<String> {
    let ext = extension_from_path(path)?;
    mime_guess::from_ext(&ext)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_ignores_query_and_fragment() {
        assert_eq!(extension_from_path("song.mp3?x=1"), Some("mp3".into()));
        assert_eq!(extension_from_path("clip.mp4#t=10"), Some("mp4".into()));
        assert_eq!(extension_from_path("/a.b/track.MP3"), Some("mp3".into()));
    }

    #[test]
    fn extension_missing() {
        assert_eq!(extension_from_path("/data/user/0/README"), None);
        assert_eq!(extension_from_path("/data/dir.d/noext"), None);
        assert_eq!(extension_from_path("trailing."), None);
    }

    #[test]
    fn mp3_maps_to_audio_mpeg() {
        assert_eq!(
            mime_type_for_path("/storage/downloads/track.mp3").as_deref(),
            Some("audio/mpeg")
        );
    }

    #[test]
    fn common_types() {
        assert_eq!(mime_type_for_path("a.png").as_deref(), Some("image/png"));
        assert_eq!(mime_type_for_path("a.txt").as_deref(), Some("text/plain"));
    }

    #[test]
    fn unknown_extension_is_absent() {
        assert_eq!(mime_type_for_path("capture.zzqx"), None);
        assert_eq!(mime_type_for_path("no_extension"), None);
    }
}
