use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use serde_json::json;
use serde_json::Value;
use todo_service::domain::todo::errors::TodoError;
use todo_service::domain::todo::models::Page;
use todo_service::domain::todo::models::Todo;
use todo_service::domain::todo::models::TodoId;
use todo_service::domain::todo::ports::TodoRepository;
use todo_service::domain::todo::service::TodoService;
use todo_service::domain::user::errors::UserError;
use todo_service::domain::user::identity::IdentityResolver;
use todo_service::domain::user::models::User;
use todo_service::domain::user::models::UserId;
use todo_service::domain::user::ports::UserRepository;
use todo_service::domain::user::service::UserService;
use todo_service::inbound::http::router::create_router;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// User store with the same uniqueness rules as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Drop a user, as an administrator deleting the row would.
    pub fn remove_by_email(&self, email: &str) {
        self.users
            .write()
            .unwrap()
            .retain(|user| user.email.as_str() != email);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserError::UsernameAlreadyExists(user.username.to_string()));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .unwrap()
            .iter()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }
}

/// Todo store keeping insertion order, so newest first is a reverse scan.
#[derive(Default)]
pub struct InMemoryTodoRepository {
    todos: RwLock<Vec<Todo>>,
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn create(&self, todo: Todo) -> Result<Todo, TodoError> {
        self.todos.write().unwrap().push(todo.clone());
        Ok(todo)
    }

    async fn find_by_id(&self, id: &TodoId) -> Result<Option<Todo>, TodoError> {
        Ok(self.todos.read().unwrap().iter().find(|t| &t.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: &UserId, page: Page) -> Result<Vec<Todo>, TodoError> {
        Ok(self
            .todos
            .read()
            .unwrap()
            .iter()
            .rev()
            .filter(|t| t.is_owned_by(owner))
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn update(&self, todo: Todo) -> Result<Todo, TodoError> {
        let mut todos = self.todos.write().unwrap();
        let slot = todos
            .iter_mut()
            .find(|t| t.id == todo.id)
            .ok_or_else(|| TodoError::NotFound(todo.id.to_string()))?;
        *slot = todo.clone();
        Ok(todo)
    }

    async fn delete(&self, id: &TodoId) -> Result<(), TodoError> {
        let mut todos = self.todos.write().unwrap();
        let before = todos.len();
        todos.retain(|t| &t.id != id);
        if todos.len() == before {
            return Err(TodoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

/// Test application that spawns a real server over in-memory storage
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub users: Arc<InMemoryUserRepository>,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let users = Arc::new(InMemoryUserRepository::default());
        let todos = Arc::new(InMemoryTodoRepository::default());
        let authenticator = Arc::new(Authenticator::new(JWT_SECRET));

        let user_service = Arc::new(UserService::new(Arc::clone(&users)));
        let todo_service = Arc::new(TodoService::new(todos));
        let identity_resolver = Arc::new(IdentityResolver::new(
            Arc::clone(&users),
            Arc::clone(&authenticator),
        ));

        let router = create_router(user_service, todo_service, identity_resolver, authenticator);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            users,
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub fn put_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .put(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    pub fn delete_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.api_client
            .delete(format!("{}{}", self.address, path))
            .bearer_auth(token)
    }

    /// Register a user and return the response body.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/users/")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in through the form endpoint.
    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/token")
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a user, log in and return the access token.
    pub async fn register_and_login(&self, username: &str, email: &str, password: &str) -> String {
        self.register(username, email, password).await;

        let body: Value = self
            .login(email, password)
            .await
            .json()
            .await
            .expect("Failed to parse response");
        body["access_token"]
            .as_str()
            .expect("access_token missing")
            .to_string()
    }

    /// Create a todo and return the `data` object of the response.
    pub async fn create_todo(&self, token: &str, title: &str, description: &str) -> Value {
        let body: Value = self
            .post_authenticated("/todos/", token)
            .json(&json!({ "title": title, "description": description }))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse response");
        body["data"].clone()
    }
}
