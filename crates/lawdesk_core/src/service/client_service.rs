//! Client registry use-case service.

use crate::lookup::CompanyInfo;
use crate::model::client::Client;
use crate::model::EntityId;
use crate::repo::audit_repo::AuditRepository;
use crate::repo::client_repo::{ClientListQuery, ClientRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::audit_service::AuditLogger;

const AUDIT_MODULE: &str = "clientes";

pub struct ClientService<R: ClientRepository, A: AuditRepository> {
    repo: R,
    audit: AuditLogger<A>,
}

impl<R: ClientRepository, A: AuditRepository> ClientService<R, A> {
    pub fn new(repo: R, audit: AuditLogger<A>) -> Self {
        Self { repo, audit }
    }

    pub fn create_client(&self, client: Client) -> RepoResult<Client> {
        let client = client.normalized();
        self.repo.create_client(&client)?;
        self.audit.log_action(
            "CREATE",
            AUDIT_MODULE,
            &format!("Criou cliente {}", client.name),
            Some("clients"),
        );
        Ok(client)
    }

    pub fn update_client(&self, client: Client) -> RepoResult<Client> {
        let client = client.normalized();
        self.repo.update_client(&client)?;
        self.audit.log_action(
            "UPDATE",
            AUDIT_MODULE,
            &format!("Editou cliente {}", client.name),
            Some("clients"),
        );
        Ok(client)
    }

    pub fn get_client(&self, id: EntityId) -> RepoResult<Client> {
        self.repo.get_client(id)?.ok_or(RepoError::NotFound {
            entity: "client",
            id,
        })
    }

    pub fn find_by_document(&self, document: &str) -> RepoResult<Option<Client>> {
        self.repo.find_client_by_document(document)
    }

    pub fn list_clients(&self, query: &ClientListQuery) -> RepoResult<Vec<Client>> {
        self.repo.list_clients(query)
    }

    pub fn delete_client(&self, id: EntityId) -> RepoResult<()> {
        let client = self.get_client(id)?;
        self.repo.delete_client(id)?;
        self.audit.log_action(
            "DELETE",
            AUDIT_MODULE,
            &format!("Excluiu cliente {}", client.name),
            Some("clients"),
        );
        Ok(())
    }
}

/// Fills blank client fields from a registry lookup; typed values win.
pub fn merge_company_info(mut client: Client, info: &CompanyInfo) -> Client {
    fn fill(slot: &mut Option<String>, value: &Option<String>) {
        if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
            if let Some(value) = value {
                *slot = Some(value.clone());
            }
        }
    }

    if client.name.trim().is_empty() {
        client.name = info.name.clone();
    }
    fill(&mut client.address, &info.address);
    fill(&mut client.number, &info.number);
    fill(&mut client.complement, &info.complement);
    fill(&mut client.city, &info.city);
    fill(&mut client.uf, &info.uf);
    fill(&mut client.email, &info.email);
    fill(&mut client.phone, &info.phone);
    client
}

#[cfg(test)]
mod tests {
    use super::merge_company_info;
    use crate::lookup::CompanyInfo;
    use crate::model::client::Client;

    #[test]
    fn merge_keeps_typed_values() {
        let mut client = Client::new("");
        client.city = Some("Niterói".to_string());
        let info = CompanyInfo {
            name: "Acme".to_string(),
            city: Some("Rio de Janeiro".to_string()),
            uf: Some("RJ".to_string()),
            ..CompanyInfo::default()
        };
        let merged = merge_company_info(client, &info);
        assert_eq!(merged.name, "Acme");
        assert_eq!(merged.city.as_deref(), Some("Niterói"));
        assert_eq!(merged.uf.as_deref(), Some("RJ"));
    }
}
