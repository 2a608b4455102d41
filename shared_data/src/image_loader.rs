use url::Url;

/// Rewrites a hosted image url so that the host serves it at `width` pixels.
///
/// Hosted images carry their size as a path segment like `s1920`; the first such segment is
/// swapped for `s{width}`. `quality` is accepted for parity with other loaders but the host picks
/// its own, so it's ignored.
pub fn sized_image_url(src: &str, width: u32, _quality: Option<u8>) -> Result<String, url::ParseError> {
	let mut url = Url::parse(src)?;

	let Some(segments) = url.path_segments() else {
		return Ok(url.into());
	};

	let mut segments = segments.map(str::to_string).collect::<Vec<_>>();

	if let Some(size) = segments.iter_mut().find(|seg| is_size_segment(seg)) {
		*size = format!("s{width}");
		let path = segments.join("/");
		url.set_path(&path);
	}

	Ok(url.into())
}

// `s` followed by something that starts like an integer, so `s1920` and `s1920-c` both count but
// `static` doesn't
fn is_size_segment(seg: &str) -> bool {
	let Some(rest) = seg.strip_prefix('s') else {
		return false;
	};

	let rest = rest.trim_start();
	let rest = rest.strip_prefix(['+', '-']).unwrap_or(rest);
	rest.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn swaps_size_segment() {
		let url = sized_image_url("https://lh3.googleusercontent.com/pw/abc/s1920/hall.jpg", 640, Some(75)).unwrap();
		assert_eq!(url, "https://lh3.googleusercontent.com/pw/abc/s640/hall.jpg");
	}

	#[test]
	fn only_first_segment_changes() {
		let url = sized_image_url("https://example.com/s100/s200/x.png", 50, None).unwrap();
		assert_eq!(url, "https://example.com/s50/s200/x.png");
	}

	#[test]
	fn suffixed_size_counts() {
		let url = sized_image_url("https://example.com/img/s1920-c/x.png", 320, None).unwrap();
		assert_eq!(url, "https://example.com/img/s320/x.png");
	}

	#[test]
	fn words_starting_with_s_are_left_alone() {
		let src = "https://example.com/static/summer/x.png";
		assert_eq!(sized_image_url(src, 320, None).unwrap(), src);
	}

	#[test]
	fn query_is_kept() {
		let url = sized_image_url("https://example.com/s10/x.png?v=2", 800, Some(90)).unwrap();
		assert_eq!(url, "https://example.com/s800/x.png?v=2");
	}

	#[test]
	fn bad_url_errors() {
		assert!(sized_image_url("not a url", 100, None).is_err());
	}
}
