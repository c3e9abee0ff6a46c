//! Transactional batch upsert
//!
//! `upsert_many` validates every entry first. Entries without a usable id
//! are set aside as [`ItemFailure`]s; the rest are written inside a single
//! transaction. A statement failure aborts and rolls back the whole
//! transaction, while validation failures never do: the valid entries still
//! commit and the rejected ones are reported next to them.

use crate::collection::Collection;
use crate::provision;
use crate::row::now_text;
use crate::store::engine_err;
use docket_core::{
    encode_document, validate_document_id, BatchReport, Document, ItemFailure, Result,
};
use rusqlite::params;
use tracing::{debug, info, warn};

struct Prepared {
    id: String,
    payload: String,
}

fn prepare(index: usize, doc: &Document) -> std::result::Result<Prepared, ItemFailure> {
    let Some(id) = doc.id() else {
        return Err(ItemFailure {
            index,
            id: None,
            message: "document has no id".to_string(),
        });
    };
    if let Err(e) = validate_document_id(id) {
        return Err(ItemFailure {
            index,
            id: Some(id.to_string()),
            message: e.to_string(),
        });
    }
    Ok(Prepared {
        id: id.to_string(),
        payload: encode_document(doc),
    })
}

impl<'s> Collection<'s> {
    /// Upsert many documents in one transaction
    ///
    /// Each document must carry its own id. Entries without one, or with an
    /// invalid one, are reported in [`BatchReport::failures`] and do not
    /// affect the others. Within the batch a repeated id is written twice
    /// and the later entry wins.
    ///
    /// # Errors
    ///
    /// Returns `Error::Engine` if the transaction cannot be opened, a
    /// write fails, or the commit fails. Nothing from the batch is kept in
    /// that case.
    pub fn upsert_many(&self, docs: Vec<Document>) -> Result<BatchReport> {
        let mut report = BatchReport::default();
        let mut valid = Vec::with_capacity(docs.len());

        for (index, doc) in docs.iter().enumerate() {
            match prepare(index, doc) {
                Ok(prepared) => valid.push(prepared),
                Err(failure) => {
                    warn!(
                        target: "docket::batch",
                        collection = %self.name(),
                        index = failure.index,
                        error = %failure.message,
                        "Batch item rejected"
                    );
                    report.failures.push(failure);
                }
            }
        }

        if valid.is_empty() {
            return Ok(report);
        }

        let sql = self.upsert_sql();
        let now = now_text();
        self.store().with_conn_mut(|conn| {
            let tx = conn.transaction().map_err(engine_err)?;
            // The table may have been dropped by another handle
            provision::create_collection_table(&tx, self.name()).map_err(engine_err)?;
            {
                let mut stmt = tx.prepare(&sql).map_err(engine_err)?;
                for item in &valid {
                    stmt.execute(params![item.id, item.payload, now])
                        .map_err(|e| {
                            warn!(
                                target: "docket::batch",
                                collection = %self.name(),
                                id = %item.id,
                                error = %e,
                                "Batch write failed, rolling back"
                            );
                            engine_err(e)
                        })?;
                }
            }
            tx.commit().map_err(engine_err)
        })?;

        report.written = valid.into_iter().map(|p| p.id).collect();
        if report.is_complete() {
            debug!(
                target: "docket::batch",
                collection = %self.name(),
                written = report.written.len(),
                "Batch committed"
            );
        } else {
            info!(
                target: "docket::batch",
                collection = %self.name(),
                written = report.written.len(),
                rejected = report.failures.len(),
                "Batch committed with rejected items"
            );
        }
        Ok(report)
    }
}
