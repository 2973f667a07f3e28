use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::Auth;
use crate::error::Result;
use crate::events::Dispatcher;
use crate::files::FileStorage;
use crate::service::{buckets, labels, lists, namespaces, tasks};
use crate::store::{Session, Store, transact};
use crate::types::{Bucket, Label, LabelTask, List, Namespace, RelationKind, Task, TaskRelation, deserialize_base64};

/// A namespace as exported by another task manager, with everything in it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceStructure {
    #[serde(flatten)]
    pub namespace: Namespace,
    pub lists: Vec<ListStructure>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListStructure {
    #[serde(flatten)]
    pub list: List,
    /// Raw background image, base64 encoded on the wire.
    #[serde(skip_serializing, deserialize_with = "deserialize_base64")]
    pub background: Vec<u8>,
    pub buckets: Vec<Bucket>,
    /// Tasks keep their source ids so buckets and relations can be remapped.
    pub tasks: Vec<Task>,
}

struct Importer<'a, 's> {
    s: &'a Session<'s>,
    auth: &'a Auth,
    events: &'a dyn Dispatcher,
    files: &'a dyn FileStorage,
    /// Labels created so far, keyed by title and color.
    labels: HashMap<(String, String), Label>,
}

/// Creates a whole namespace tree for the calling user in one transaction.
///
/// Ids in the payload are only used to connect tasks to buckets and to each
/// other; everything gets fresh ids. Any failure rolls back the complete
/// import.
pub fn insert_from_structure<S>(
    store: &S,
    auth: &Auth,
    events: &dyn Dispatcher,
    files: &dyn FileStorage,
    structure: &mut [NamespaceStructure],
) -> Result<()>
where
    S: Store + ?Sized,
{
    auth.require_user()?;
    tracing::debug!(namespaces = structure.len(), "Creating structure");

    transact(store, |s| {
        let mut importer = Importer {
            s,
            auth,
            events,
            files,
            labels: HashMap::new(),
        };
        for namespace in structure.iter_mut() {
            importer.namespace(namespace)?;
        }
        tracing::debug!("Done inserting structure");
        Ok(())
    })
}

impl Importer<'_, '_> {
    fn namespace(&mut self, structure: &mut NamespaceStructure) -> Result<()> {
        structure.namespace.id = 0;
        namespaces::create(self.s, self.auth, &mut structure.namespace)?;
        tracing::debug!(
            namespace_id = structure.namespace.id,
            lists = structure.lists.len(),
            "Created namespace"
        );

        for list in &mut structure.lists {
            list.list.namespace_id = structure.namespace.id;
            self.list(list)?;
        }
        Ok(())
    }

    fn list(&mut self, structure: &mut ListStructure) -> Result<()> {
        let s = self.s;
        structure.list.id = 0;
        lists::create(s, self.auth, &mut structure.list)?;
        let list_id = structure.list.id;
        tracing::debug!(list_id, "Created list");

        let default_bucket = s.default_bucket(list_id)?;

        if !structure.background.is_empty() {
            structure.list = lists::upload_background(s, self.auth, self.files, list_id, "", &structure.background)?;
            tracing::debug!(list_id, "Created background");
        }

        let mut bucket_ids = HashMap::new();
        for bucket in &mut structure.buckets {
            let old_id = bucket.id;
            bucket.id = 0;
            bucket.list_id = list_id;
            buckets::create(s, self.auth, bucket)?;
            bucket_ids.insert(old_id, bucket.id);
            tracing::debug!(bucket_id = bucket.id, old_id, "Created bucket");
        }

        let mut task_ids = HashMap::new();
        let mut pending_relations = Vec::new();
        let mut needs_default_bucket = false;

        for task in &mut structure.tasks {
            match bucket_ids.get(&task.bucket_id) {
                Some(new_id) => task.bucket_id = *new_id,
                None => {
                    if task.bucket_id > 0 {
                        tracing::debug!(old_id = task.bucket_id, "No bucket created for original bucket");
                    }
                    task.bucket_id = 0;
                    needs_default_bucket = true;
                }
            }

            let old_id = task.id;
            let related = std::mem::take(&mut task.related_tasks);
            let attachments = std::mem::take(&mut task.attachments);
            let task_labels = std::mem::take(&mut task.labels);

            task.id = 0;
            task.list_id = list_id;
            tasks::create(s, self.auth, self.events, task)?;
            task_ids.insert(old_id, task.id);
            tracing::debug!(task_id = task.id, old_id, "Created task");

            for attachment in attachments.iter().filter(|a| !a.file.content.is_empty()) {
                let created =
                    tasks::add_attachment(s, self.auth, self.files, task.id, &attachment.file.name, &attachment.file.content)?;
                tracing::debug!(attachment_id = created.id, "Created attachment");
                task.attachments.push(created);
            }

            for label in task_labels {
                let label = self.label(label)?;
                if !s.label_is_on_task(label.id, task.id)? {
                    let mut label_task = LabelTask {
                        label_id: label.id,
                        task_id: task.id,
                        ..Default::default()
                    };
                    labels::add_to_task(s, self.auth, &mut label_task)?;
                }
                task.labels.push(label);
            }

            pending_relations.push((task.id, related));
        }

        for (task_id, related) in pending_relations {
            if self.relations(list_id, task_id, related, &task_ids)? {
                needs_default_bucket = true;
            }
        }

        if !needs_default_bucket && !structure.buckets.is_empty() {
            if let Some(bucket) = default_bucket {
                s.delete_bucket(bucket.id)?;
                tracing::debug!(bucket_id = bucket.id, "Removed unused default bucket");
            }
        }
        Ok(())
    }

    /// Reuses a label already imported with the same title and color.
    fn label(&mut self, mut label: Label) -> Result<Label> {
        let key = (label.title.clone(), label.hex_color.clone());
        if let Some(existing) = self.labels.get(&key) {
            return Ok(existing.clone());
        }

        label.id = 0;
        labels::create(self.s, self.auth, &mut label)?;
        tracing::debug!(label_id = label.id, "Created label");
        self.labels.insert(key, label.clone());
        Ok(label)
    }

    /// Returns whether a new related task had to be created, which lands in
    /// the default bucket.
    fn relations(
        &mut self,
        list_id: i64,
        task_id: i64,
        related: BTreeMap<RelationKind, Vec<Task>>,
        task_ids: &HashMap<i64, i64>,
    ) -> Result<bool> {
        let mut created_task = false;

        for (kind, others) in related {
            for mut other in others {
                let other_id = if other.id == 0 {
                    other.list_id = list_id;
                    other.bucket_id = 0;
                    tasks::create(self.s, self.auth, self.events, &mut other)?;
                    created_task = true;
                    tracing::debug!(task_id = other.id, "Created related task");
                    other.id
                } else if let Some(new_id) = task_ids.get(&other.id) {
                    *new_id
                } else {
                    tracing::debug!(old_id = other.id, "Skipping relation to a task outside the import");
                    continue;
                };

                if self.s.task_relation_exists(task_id, other_id, kind)? {
                    continue;
                }
                let mut relation = TaskRelation {
                    task_id,
                    other_task_id: other_id,
                    relation_kind: kind,
                    created_by_id: 0,
                    created: Utc::now(),
                };
                tasks::create_relation(self.s, self.auth, &mut relation)?;
                tracing::debug!(task_id, other_task_id = other_id, %kind, "Created task relation");
            }
        }
        Ok(created_task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::service::Window;
    use crate::testing::Fixture;

    const PAYLOAD: &str = r#"[
      {
        "title": "Imported",
        "lists": [
          {
            "title": "Chores",
            "background": "aW1hZ2U=",
            "buckets": [
              {"id": 10, "title": "Todo"},
              {"id": 11, "title": "Done", "is_done_bucket": true}
            ],
            "tasks": [
              {
                "id": 1, "title": "Vacuum", "bucket_id": 10,
                "labels": [{"title": "home", "hex_color": "00ff00"}],
                "related_tasks": {"blocking": [{"id": 2}]}
              },
              {
                "id": 2, "title": "Tidy up", "bucket_id": 11,
                "labels": [{"title": "home", "hex_color": "00ff00"}],
                "attachments": [{"file": {"name": "plan.txt", "content": "cGxhbg=="}}]
              }
            ]
          },
          {
            "title": "Loose ends",
            "tasks": [{"id": 3, "title": "No bucket", "bucket_id": 99}]
          }
        ]
      }
    ]"#;

    #[test]
    fn test_imports_whole_tree() {
        let fx = Fixture::new();
        let auth = fx.auth(&fx.bob);
        let mut structure: Vec<NamespaceStructure> = serde_json::from_str(PAYLOAD).unwrap();

        insert_from_structure(&fx.store, &auth, &fx.events, &fx.files, &mut structure).unwrap();

        let s = fx.session();
        let chores = &structure[0].lists[0];
        assert!(chores.list.background_file_id.is_some());

        let buckets = s.list_buckets(chores.list.id).unwrap();
        let titles: Vec<&str> = buckets.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, vec!["Todo", "Done"]);

        let tasks = tasks::read_all(&s, &auth, chores.list.id, &Window::all()).unwrap();
        assert_eq!(tasks.total, 2);
        let tidy = tasks.items.iter().find(|t| t.title == "Tidy up").unwrap();
        assert!(tidy.done);
        assert_eq!(tidy.labels.len(), 1);

        let vacuum = tasks::read_one(&s, &auth, chores.tasks[0].id).unwrap();
        assert_eq!(vacuum.related_tasks[&RelationKind::Blocking][0].id, tidy.id);
        assert_eq!(vacuum.labels[0].id, tidy.labels[0].id);

        let tidy = tasks::read_one(&s, &auth, tidy.id).unwrap();
        assert_eq!(tidy.attachments.len(), 1);
        assert_eq!(tidy.attachments[0].file.name, "plan.txt");

        let loose = &structure[0].lists[1];
        let buckets = s.list_buckets(loose.list.id).unwrap();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].title, lists::DEFAULT_BUCKET_TITLE);
    }

    #[test]
    fn test_failure_rolls_back_everything() {
        let fx = Fixture::new();
        let auth = fx.auth(&fx.bob);
        let mut structure: Vec<NamespaceStructure> = serde_json::from_str(
            r#"[{"title": "Half", "lists": [{"title": "Ok"}, {"title": ""}]}]"#,
        )
        .unwrap();

        let result = insert_from_structure(&fx.store, &auth, &fx.events, &fx.files, &mut structure);
        assert!(matches!(result, Err(Error::ListTitleCannotBeEmpty)));

        let s = fx.session();
        let page = namespaces::read_all(&s, &auth, &Window::all(), true).unwrap();
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_link_share_cannot_import() {
        let fx = Fixture::new();
        let auth = fx.link_share_auth(crate::types::Right::ADMIN);
        let mut structure = vec![NamespaceStructure::default()];
        let result = insert_from_structure(&fx.store, &auth, &fx.events, &fx.files, &mut structure);
        assert!(matches!(result, Err(Error::Forbidden)));
    }
}
