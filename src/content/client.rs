use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use log::{debug, error, warn};

use super::model::{AboutRecord, ContactRecord, ProjectRecord};
use super::repository::{ContentError, ContentRepository};

pub const FALLBACK_CATEGORIES: [&str; 3] = ["visuals", "algolab", "installations"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentQuery {
    Categories,
    ProjectsByCategory(String),
    Project { category: String, slug: String },
    Contacts,
    About,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContentPayload {
    Categories(Vec<String>),
    Projects(Vec<ProjectRecord>),
    Project(Option<ProjectRecord>),
    Contacts(Vec<ContactRecord>),
    About(AboutRecord),
}

/// Memoizes the first successful result per content type. Failures are not
/// cached, so a later request retries the repository.
pub struct ContentCache<R> {
    repository: R,
    projects: Option<Vec<ProjectRecord>>,
    categories: Option<Vec<String>>,
    contacts: Option<Vec<ContactRecord>>,
    about: Option<AboutRecord>,
}

impl<R: ContentRepository> ContentCache<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            projects: None,
            categories: None,
            contacts: None,
            about: None,
        }
    }

    fn projects(&mut self) -> Result<&[ProjectRecord], ContentError> {
        if self.projects.is_none() {
            self.projects = Some(self.repository.projects()?);
        }
        Ok(self.projects.as_deref().unwrap_or_default())
    }

    /// Distinct project categories in first-seen order, or the static fallback
    /// set when the project index cannot be loaded.
    pub fn categories(&mut self) -> Vec<String> {
        if let Some(categories) = &self.categories {
            return categories.clone();
        }

        match self.projects() {
            Ok(projects) => {
                let mut categories: Vec<String> = Vec::new();
                for project in projects {
                    if !project.category.is_empty() && !categories.contains(&project.category) {
                        categories.push(project.category.clone());
                    }
                }
                self.categories = Some(categories.clone());
                categories
            }
            Err(error) => {
                warn!("category listing unavailable, using fallback set: {error}");
                FALLBACK_CATEGORIES.iter().map(|c| c.to_string()).collect()
            }
        }
    }

    pub fn projects_by_category(&mut self, category: &str) -> Result<Vec<ProjectRecord>, ContentError> {
        Ok(self
            .projects()?
            .iter()
            .filter(|project| project.category == category)
            .cloned()
            .collect())
    }

    pub fn project(&mut self, category: &str, slug: &str) -> Result<Option<ProjectRecord>, ContentError> {
        Ok(self
            .projects()?
            .iter()
            .find(|project| project.category == category && project.slug == slug)
            .cloned())
    }

    pub fn contacts(&mut self) -> Result<Vec<ContactRecord>, ContentError> {
        if self.contacts.is_none() {
            self.contacts = Some(self.repository.contacts()?);
        }
        Ok(self.contacts.clone().unwrap_or_default())
    }

    pub fn about(&mut self) -> Result<AboutRecord, ContentError> {
        if self.about.is_none() {
            self.about = Some(self.repository.about()?);
        }
        Ok(self.about.clone().unwrap_or_default())
    }

    pub fn answer(&mut self, query: &ContentQuery) -> Result<ContentPayload, ContentError> {
        match query {
            ContentQuery::Categories => Ok(ContentPayload::Categories(self.categories())),
            ContentQuery::ProjectsByCategory(category) => self
                .projects_by_category(category)
                .map(ContentPayload::Projects),
            ContentQuery::Project { category, slug } => {
                self.project(category, slug).map(ContentPayload::Project)
            }
            ContentQuery::Contacts => self.contacts().map(ContentPayload::Contacts),
            ContentQuery::About => self.about().map(ContentPayload::About),
        }
    }
}

pub struct ContentReply<T> {
    pub ticket: T,
    pub result: Result<ContentPayload, ContentError>,
}

/// Serves content queries on one background thread. Each request carries an
/// opaque ticket that is handed back untouched with the reply.
pub struct ContentClient<T> {
    request_tx: Sender<(T, ContentQuery)>,
    reply_rx: Receiver<ContentReply<T>>,
}

impl<T: Send + 'static> ContentClient<T> {
    pub fn spawn<R: ContentRepository>(repository: R) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<(T, ContentQuery)>();
        let (reply_tx, reply_rx) = mpsc::channel();

        thread::spawn(move || {
            let mut cache = ContentCache::new(repository);
            for (ticket, query) in request_rx {
                debug!("serving content query {query:?}");
                let result = cache.answer(&query);
                if let Err(error) = &result {
                    error!("content query {query:?} failed: {error}");
                }
                if reply_tx.send(ContentReply { ticket, result }).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx,
            reply_rx,
        }
    }

    pub fn submit(&self, ticket: T, query: ContentQuery) -> Result<(), ContentError> {
        self.request_tx
            .send((ticket, query))
            .map_err(|_| ContentError::WorkerGone)
    }

    /// Drains every reply that has arrived since the last poll.
    pub fn poll(&self) -> Vec<ContentReply<T>> {
        let mut replies = Vec::new();
        loop {
            match self.reply_rx.try_recv() {
                Ok(reply) => replies.push(reply),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!("content worker disconnected");
                    break;
                }
            }
        }
        replies
    }

    #[cfg(test)]
    pub(crate) fn wait(&self, timeout: std::time::Duration) -> Option<ContentReply<T>> {
        self.reply_rx.recv_timeout(timeout).ok()
    }
}
