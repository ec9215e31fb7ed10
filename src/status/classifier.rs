// src/status/classifier.rs

/// Maps a probe failure to the HTTP-shaped classification the report
/// buckets by (§4.I). Network errors don't carry a real status code, so
/// the pipeline manufactures one that groups sensibly in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    Timeout,
    NetworkUnreachable,
    Cancelled,
    Other,
}

impl ProbeFailure {
    pub fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            return ProbeFailure::Timeout;
        }
        if error.is_connect() {
            let msg = error.to_string().to_lowercase();
            if msg.contains("network is unreachable") {
                return ProbeFailure::NetworkUnreachable;
            }
        }
        ProbeFailure::Other
    }

    pub fn status_code(self) -> i32 {
        match self {
            ProbeFailure::Timeout => 504,
            ProbeFailure::NetworkUnreachable => 503,
            ProbeFailure::Cancelled => 404,
            ProbeFailure::Other => 404,
        }
    }

    pub fn status_text(self) -> &'static str {
        match self {
            ProbeFailure::Timeout => "Gateway Timeout",
            ProbeFailure::NetworkUnreachable => "Service Unavailable",
            ProbeFailure::Cancelled => "Not Found",
            ProbeFailure::Other => "Not Found",
        }
    }
}

/// Canonical reason phrase for an HTTP status code, for the small set
/// this pipeline actually sees. Falls back to "Unknown" rather than
/// carrying a full registry.
pub fn reason_phrase(code: i32) -> &'static str {
    match code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        408 => "Request Timeout",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// Status class used to group the printed summary: "2xx", "3xx", …
pub fn status_class(code: i32) -> &'static str {
    match code {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "5xx",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, "2xx")]
    #[case(301, "3xx")]
    #[case(404, "4xx")]
    #[case(500, "5xx")]
    #[case(504, "5xx")]
    #[case(999, "5xx")]
    fn status_class_buckets_by_hundreds(#[case] code: i32, #[case] expected: &str) {
        assert_eq!(status_class(code), expected);
    }

    #[rstest]
    #[case(ProbeFailure::Timeout, 504, "Gateway Timeout")]
    #[case(ProbeFailure::NetworkUnreachable, 503, "Service Unavailable")]
    #[case(ProbeFailure::Cancelled, 404, "Not Found")]
    #[case(ProbeFailure::Other, 404, "Not Found")]
    fn probe_failure_maps_to_documented_codes(
        #[case] failure: ProbeFailure,
        #[case] code: i32,
        #[case] text: &str,
    ) {
        assert_eq!(failure.status_code(), code);
        assert_eq!(failure.status_text(), text);
    }
}
