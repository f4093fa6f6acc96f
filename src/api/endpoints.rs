// Backend endpoint paths, relative to the configured API base URL

pub mod auth {
    pub const LOGIN: &str = "/auth/login";
    pub const GOOGLE: &str = "/auth/google";
    pub const LINE_TOKEN: &str = "/auth/line/token";
    pub const CURRENT_USER: &str = "/auth/current_user";
}

pub mod voice {
    pub const LIST: &str = "/api/voice/recordings";

    pub fn detail(id: &str) -> String {
        format!("/api/voice/recordings/{}", urlencoding::encode(id))
    }

    pub fn status(id: &str) -> String {
        format!("/api/voice/recordings/{}/status", urlencoding::encode(id))
    }
}

pub mod contacts {
    pub const LIST: &str = "/api/contact/";
    pub const CREATE: &str = "/api/contact/";

    pub fn detail(id: &str) -> String {
        format!("/api/contact/{}", urlencoding::encode(id))
    }
}

pub mod manager {
    pub const DASHBOARD: &str = "/api/manager/dashboard";
    pub const SUBORDINATES: &str = "/api/manager/subordinates";
    pub const TEAM_SUMMARY: &str = "/api/manager/team-summary";

    pub fn subordinate_recordings(id: &str) -> String {
        format!(
            "/api/manager/subordinates/{}/recordings",
            urlencoding::encode(id)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_escape_ids() {
        assert_eq!(voice::detail("42"), "/api/voice/recordings/42");
        assert_eq!(voice::status("42"), "/api/voice/recordings/42/status");
        assert_eq!(contacts::detail("a/b"), "/api/contact/a%2Fb");
        assert_eq!(
            manager::subordinate_recordings("7"),
            "/api/manager/subordinates/7/recordings"
        );
    }
}
