use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::chat::ChatLog;
use crate::derive;
use crate::error::LoadError;
use crate::filter::{self, FilterOptions, Predicates};
use crate::loader::{self, DataSource};
use crate::models::EmployeeTable;

/// State owned by one user session: the loaded sheet and the chat log.
/// Handlers receive it by reference; nothing here is shared between sessions.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    source: DataSource,
    table: EmployeeTable,
    load_error: Option<LoadError>,
    loaded_at: DateTime<Utc>,
    chat: ChatLog,
}

impl Session {
    pub async fn start(client: &reqwest::Client, source: DataSource) -> Self {
        let mut session = Self::from_table(source, EmployeeTable::default());
        session.reload(client).await;
        info!(session = %session.id, "session started");
        session
    }

    /// Builds a session around an already loaded table.
    pub fn from_table(source: DataSource, table: EmployeeTable) -> Self {
        let loaded_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source,
            table: derive::derive(&table, loaded_at.date_naive()),
            load_error: None,
            loaded_at,
            chat: ChatLog::default(),
        }
    }

    /// Pulls a fresh copy of the sheet, replacing the table. The chat log is
    /// kept.
    pub async fn reload(&mut self, client: &reqwest::Client) {
        let outcome = loader::load(client, &self.source).await;
        self.loaded_at = Utc::now();
        self.table = derive::derive(&outcome.table, self.loaded_at.date_naive());
        self.load_error = outcome.error;
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn table(&self) -> &EmployeeTable {
        &self.table
    }

    pub fn load_error(&self) -> Option<&LoadError> {
        self.load_error.as_ref()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn filtered(&self, predicates: &Predicates) -> EmployeeTable {
        filter::filter(&self.table, predicates)
    }

    pub fn options(&self) -> FilterOptions {
        FilterOptions::from_table(&self.table)
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatLog {
        &mut self.chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SHEET: &str = "\
Employee_ID,Department,Job_Title,Hire_Date
E1,Sales,Analyst,2019-03-01
E2,IT,Engineer,2021-06-15
";

    #[tokio::test]
    async fn start_loads_and_derives() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SHEET))
            .mount(&server)
            .await;

        let session = Session::start(&reqwest::Client::new(), DataSource::Url(server.uri())).await;
        assert!(session.load_error().is_none());
        assert_eq!(session.table().len(), 2);
        assert!(session.table().rows.iter().all(|r| r.years_at_company.is_some()));

        let predicates = Predicates {
            department: Selection::parse("IT"),
            ..Default::default()
        };
        assert_eq!(session.filtered(&predicates).len(), 1);
        assert_eq!(session.table().len(), 2);
        assert_eq!(session.options().departments, vec!["All", "IT", "Sales"]);
    }

    #[tokio::test]
    async fn reload_keeps_chat_and_replaces_table() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let mut session = Session::from_table(
            DataSource::Url(server.uri()),
            crate::loader::parse_table(SHEET.as_bytes()).unwrap(),
        );
        let id = session.id;
        session.chat_mut().submit("how are we doing?");

        session.reload(&client).await;
        assert!(session.table().is_empty());
        assert!(session.load_error().is_some());
        assert_eq!(session.chat().messages().len(), 2);
        assert_eq!(session.id, id);
    }

    #[test]
    fn sessions_are_isolated() {
        let source = DataSource::File("employees.csv".into());
        let mut first = Session::from_table(source.clone(), EmployeeTable::default());
        let second = Session::from_table(source, EmployeeTable::default());
        first.chat_mut().submit("hi");
        assert!(second.chat().is_empty());
        assert_ne!(first.id, second.id);
    }
}
