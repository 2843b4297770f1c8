//! Comment queries and mutations.

use crate::error::{Error, Result};
use crate::query::client::QueryClient;
use crate::query::keys;
use crate::tasks::Comment;

impl QueryClient {
    /// Comments on a task, oldest first as served.
    ///
    /// # Errors
    ///
    /// Returns the fetch error once retries are exhausted.
    pub fn comments(&mut self, project_id: &str, task_id: &str) -> Result<Vec<Comment>> {
        let stale = self.config.stale_times.comments();
        self.fetch(keys::comments::list(project_id, task_id), stale, |api| {
            api.list_comments(project_id, task_id)
        })
    }

    /// Add a comment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for blank content, otherwise the
    /// service error. Either is notified.
    pub fn create_comment(&mut self, project_id: &str, task_id: &str, content: &str) -> Result<Comment> {
        let content = self.require_content(content)?;
        let comment =
            self.mutate("Comment added", |api| api.create_comment(project_id, task_id, content))?;
        self.cache.invalidate(&keys::comments::list(project_id, task_id));
        Ok(comment)
    }

    /// Edit a comment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for blank content, otherwise the
    /// service error. Either is notified.
    pub fn update_comment(
        &mut self,
        project_id: &str,
        task_id: &str,
        comment_id: &str,
        content: &str,
    ) -> Result<Comment> {
        let content = self.require_content(content)?;
        let comment = self.mutate("Comment updated", |api| {
            api.update_comment(project_id, task_id, comment_id, content)
        })?;
        self.cache.invalidate(&keys::comments::list(project_id, task_id));
        Ok(comment)
    }

    /// Delete a comment.
    ///
    /// # Errors
    ///
    /// Returns the service error after notifying it.
    pub fn delete_comment(&mut self, project_id: &str, task_id: &str, comment_id: &str) -> Result<()> {
        self.mutate("Comment deleted", |api| api.delete_comment(project_id, task_id, comment_id))?;
        self.cache.invalidate(&keys::comments::list(project_id, task_id));
        Ok(())
    }

    fn require_content<'a>(&self, content: &'a str) -> Result<&'a str> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(self.fail(Error::InvalidArgument("Comment cannot be empty".to_string())));
        }
        Ok(trimmed)
    }
}
