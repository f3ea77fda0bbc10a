//! Endpoint URIs of signal-cli-rest-api.

/// Builds endpoint URIs for one account on one service.
#[derive(Debug, Clone)]
pub(crate) struct Uris {
    service: String,
    phone_number: String,
}

impl Uris {
    pub fn new(service: &str, phone_number: &str) -> Self {
        Self {
            service: service.trim_end_matches('/').to_string(),
            phone_number: phone_number.to_string(),
        }
    }

    fn http(&self, https: bool) -> String {
        let scheme = if https { "https" } else { "http" };
        format!("{scheme}://{}", self.service)
    }

    pub fn receive_ws(&self, https: bool) -> String {
        let scheme = if https { "wss" } else { "ws" };
        format!("{scheme}://{}/v1/receive/{}", self.service, self.phone_number)
    }

    pub fn send(&self, https: bool) -> String {
        format!("{}/v2/send", self.http(https))
    }

    pub fn reactions(&self, https: bool) -> String {
        format!("{}/v1/reactions/{}", self.http(https), self.phone_number)
    }

    pub fn receipts(&self, https: bool) -> String {
        format!("{}/v1/receipts/{}", self.http(https), self.phone_number)
    }

    pub fn typing_indicator(&self, https: bool) -> String {
        format!("{}/v1/typing-indicator/{}", self.http(https), self.phone_number)
    }

    pub fn groups(&self, https: bool) -> String {
        format!("{}/v1/groups/{}", self.http(https), self.phone_number)
    }

    pub fn group(&self, https: bool, group_id: &str) -> String {
        format!("{}/{group_id}", self.groups(https))
    }

    pub fn attachment(&self, https: bool, attachment_id: &str) -> String {
        format!("{}/v1/attachments/{attachment_id}", self.http(https))
    }

    pub fn contacts(&self, https: bool) -> String {
        format!("{}/v1/contacts/{}", self.http(https), self.phone_number)
    }

    pub fn remote_delete(&self, https: bool) -> String {
        format!("{}/v1/remote-delete/{}", self.http(https), self.phone_number)
    }

    pub fn health(&self, https: bool) -> String {
        format!("{}/v1/health", self.http(https))
    }

    pub fn about(&self, https: bool) -> String {
        format!("{}/v1/about", self.http(https))
    }
}
