//! Collaborator and link lookups used by project management directives.

/// Who may see a project.
pub trait ProjectAccess: Send + Sync {
    /// User ids of everyone collaborating on `project_id`.
    fn list_collaborators(&self, project_id: &str) -> Vec<String>;
}

pub trait AppContextProvider: Send + Sync {
    fn url_to_sample_page(&self, project_id: &str, experiment_id: &str) -> String;
}

/// Sample pages below one public base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrlContext {
    base_url: String,
}

impl BaseUrlContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url }
    }
}

impl AppContextProvider for BaseUrlContext {
    fn url_to_sample_page(&self, project_id: &str, experiment_id: &str) -> String {
        format!(
            "{}/projects/{project_id}/experiments/{experiment_id}/samples",
            self.base_url
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_page_url() {
        let context = BaseUrlContext::new("https://data.example.org");
        assert_eq!(
            context.url_to_sample_page("P1", "E1"),
            "https://data.example.org/projects/P1/experiments/E1/samples"
        );
    }
}
