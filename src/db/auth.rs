use crate::db::UrlDb;
use crate::state::AuthData;
use crate::tree::{split_segments, PathId};
use crate::url::{decompose_url, directory_of};
use crate::UrlResult;

impl UrlDb {
    /// Stores HTTP authentication details for the directory containing a URL
    ///
    /// The leafname is stripped, so details set for `http://h/a/b.html` are
    /// stored on `http://h/a/` and apply to everything below it. The
    /// directory is added to the database if needed.
    pub fn set_auth_details(&mut self, url: &str, realm: &str, credentials: &str) -> UrlResult<()> {
        let parts = decompose_url(url)?;
        let directory = directory_of(parts.path_only()).to_string();
        let host = self.add_indexed_host(&parts.host)?;

        let authority = match parts.port {
            0 => parts.host.clone(),
            port => format!("{}:{}", parts.host, port),
        };
        let dir_url = format!("{}://{}{}", parts.scheme, authority, directory);

        let id = self.add_path(&parts.scheme, parts.port, host, &directory, None, &dir_url);
        self.paths.get_mut(id).auth = Some(AuthData {
            realm: realm.to_string(),
            credentials: credentials.to_string(),
        });
        Ok(())
    }

    /// Looks up authentication details for a URL in a realm
    ///
    /// The deepest known node on the URL's path is checked first, then the
    /// directory entry of it and each of its ancestors, closest first. The
    /// URL itself doesn't need to be in the database.
    pub fn get_auth_details(&self, url: &str, realm: &str) -> Option<&str> {
        let parts = decompose_url(url).ok()?;
        let host = self.index.find(&parts.host)?;
        let root = self.hosts.get(host).paths;

        let deepest = self.deepest_node(root, &parts.scheme, parts.port, &parts.path);
        let matches = |id: PathId| {
            self.paths
                .get(id)
                .auth
                .as_ref()
                .filter(|auth| auth.realm == realm)
                .map(|auth| auth.credentials.as_str())
        };

        if let Some(credentials) = matches(deepest) {
            return Some(credentials);
        }

        let mut node = Some(deepest);
        while let Some(id) = node {
            let directory = self.paths.find_child(id, "", &parts.scheme, parts.port);
            if let Some(credentials) = directory.and_then(matches) {
                return Some(credentials);
            }
            node = self.paths.get(id).parent;
        }
        None
    }

    /// Follows a path as far as it exists in the tree
    fn deepest_node(&self, root: PathId, scheme: &str, port: u16, path: &str) -> PathId {
        let mut node = root;
        for segment in split_segments(path) {
            match self.paths.find_child(node, segment, scheme, port) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// Allows or forbids invalid TLS certificates for a URL's host
    ///
    /// The flag is host-wide. The URL is added to the database if needed.
    pub fn set_cert_permissions(&mut self, url: &str, permit: bool) -> UrlResult<()> {
        let id = self.add_url(url)?;
        if let Some(host) = self.paths.owning_host(id) {
            self.hosts.get_mut(host).permit_invalid_certs = permit;
        }
        Ok(())
    }

    /// Returns whether invalid certificates are allowed for a URL's host
    ///
    /// False for URLs not in the database.
    pub fn get_cert_permissions(&self, url: &str) -> bool {
        self.find_url(url)
            .and_then(|id| self.paths.owning_host(id))
            .is_some_and(|host| self.hosts.get(host).permit_invalid_certs)
    }
}
