// src/scaffold/assets.rs

//! The embedded deployment tree
//!
//! Every file `mediashare init` renders lives here as a constant. The
//! tree is fixed: an Ansible project (inventories, group vars, two
//! playbooks, three roles), a Galaxy collection manifest, and the
//! container build files for the API itself. Paths are relative to the
//! scaffold root and always use forward slashes.

/// One file of the deployment tree
#[derive(Debug, Clone, Copy)]
pub struct Asset {
    /// Path relative to the scaffold root
    pub path: &'static str,
    /// Full file contents
    pub contents: &'static str,
}

const ANSIBLE_CFG: &str = r"[defaults]
inventory = inventory/dev.yml
roles_path = roles
host_key_checking = False
retry_files_enabled = False
stdout_callback = yaml
interpreter_python = auto_silent
timeout = 30

[ssh_connection]
pipelining = True
";

const REQUIREMENTS_YML: &str = r#"---
# Galaxy collections the playbooks depend on.
collections:
  - name: community.docker
    version: ">=3.4.0"
  - name: community.general
    version: ">=8.0.0"
"#;

const INVENTORY_DEV_YML: &str = r"---
all:
  vars:
    env_name: development
    ansible_user: deploy
  children:
    web:
      hosts:
        dev-web-01:
          ansible_host: 10.0.10.11
        dev-web-02:
          ansible_host: 10.0.10.12
";

const INVENTORY_PROD_YML: &str = r"---
all:
  vars:
    env_name: production
    ansible_user: deploy
  children:
    web:
      hosts:
        prod-web-01:
          ansible_host: 10.0.20.11
        prod-web-02:
          ansible_host: 10.0.20.12
        prod-web-03:
          ansible_host: 10.0.20.13
";

const GROUP_VARS_ALL_YML: &str = r#"---
app_name: mediashare
app_image: mediashare/api
app_version: "1.0.0"
app_port: 8000
cloud_provider: unknown
health_check_path: /health
health_check_retries: 10
health_check_delay: 5
"#;

const GROUP_VARS_DEV_YML: &str = r"---
environment_tag: development
cloud_provider: unknown
";

const GROUP_VARS_PROD_YML: &str = r"---
environment_tag: production
cloud_provider: aws
";

const PLAYBOOK_SITE_YML: &str = r"---
- name: Provision MediaShare hosts
  hosts: web
  become: true
  roles:
    - common
    - docker

- name: Deploy the MediaShare API
  import_playbook: deploy.yml
";

const PLAYBOOK_DEPLOY_YML: &str = r"---
- name: Deploy the MediaShare API container
  hosts: web
  become: true
  roles:
    - mediashare_app
";

const COMMON_TASKS_YML: &str = r#"---
- name: Update apt cache
  ansible.builtin.apt:
    update_cache: true
    cache_valid_time: 3600

- name: Install base packages
  ansible.builtin.apt:
    name:
      - ca-certificates
      - curl
      - gnupg
      - python3-pip
    state: present

- name: Set timezone to UTC
  community.general.timezone:
    name: Etc/UTC
  notify: Restart cron

- name: Allow the application port through UFW
  community.general.ufw:
    rule: allow
    port: "{{ app_port }}"
    proto: tcp
  ignore_errors: true
"#;

const COMMON_HANDLERS_YML: &str = r"---
- name: Restart cron
  ansible.builtin.systemd:
    name: cron
    state: restarted
";

const DOCKER_TASKS_YML: &str = r#"---
- name: Ensure the apt keyring directory exists
  ansible.builtin.file:
    path: /etc/apt/keyrings
    state: directory
    mode: "0755"

- name: Add the Docker apt signing key
  ansible.builtin.get_url:
    url: https://download.docker.com/linux/ubuntu/gpg
    dest: /etc/apt/keyrings/docker.asc
    mode: "0644"

- name: Add the Docker apt repository
  ansible.builtin.apt_repository:
    repo: "deb [signed-by=/etc/apt/keyrings/docker.asc] https://download.docker.com/linux/ubuntu {{ ansible_distribution_release }} {{ docker_apt_channel }}"
    state: present

- name: Install the Docker engine
  ansible.builtin.apt:
    name:
      - docker-ce
      - docker-ce-cli
      - containerd.io
    state: present
    update_cache: true
  notify: Restart docker

- name: Ensure the docker service is running
  ansible.builtin.systemd:
    name: docker
    state: started
    enabled: true

- name: Install the Docker SDK for Python
  ansible.builtin.pip:
    name: docker
    state: present
"#;

const DOCKER_HANDLERS_YML: &str = r"---
- name: Restart docker
  ansible.builtin.systemd:
    name: docker
    state: restarted
";

const DOCKER_DEFAULTS_YML: &str = r"---
docker_apt_channel: stable
";

const APP_TASKS_YML: &str = r#"---
- name: Pull the MediaShare API image
  community.docker.docker_image:
    name: "{{ app_image }}:{{ app_version }}"
    source: pull
  register: image_pull
  retries: 3
  delay: 5
  until: image_pull is succeeded

- name: Ensure the runtime config directory exists
  ansible.builtin.file:
    path: "/etc/{{ app_name }}"
    state: directory
    mode: "0755"

- name: Render the runtime environment file
  ansible.builtin.template:
    src: env.j2
    dest: "/etc/{{ app_name }}/runtime.env"
    mode: "0640"

- name: Start the MediaShare API container
  community.docker.docker_container:
    name: "{{ app_name }}"
    image: "{{ app_image }}:{{ app_version }}"
    state: started
    restart_policy: unless-stopped
    recreate: "{{ image_pull is changed }}"
    env_file: "/etc/{{ app_name }}/runtime.env"
    published_ports:
      - "{{ app_port }}:8000"

- name: Wait for the health endpoint to report healthy
  ansible.builtin.uri:
    url: "http://127.0.0.1:{{ app_port }}{{ health_check_path }}"
    status_code: 200
  register: health_probe
  retries: "{{ health_check_retries }}"
  delay: "{{ health_check_delay }}"
  until: health_probe.status == 200
"#;

const APP_DEFAULTS_YML: &str = r#"---
app_name: mediashare
app_image: mediashare/api
app_version: "1.0.0"
app_port: 8000
environment_tag: development
cloud_provider: unknown
health_check_path: /health
health_check_retries: 10
health_check_delay: 5
"#;

const APP_ENV_TEMPLATE: &str = r"APP_VERSION={{ app_version }}
ENVIRONMENT={{ environment_tag }}
CLOUD_PROVIDER={{ cloud_provider }}
";

const DOCKERFILE: &str = r#"# syntax=docker/dockerfile:1

FROM rust:1.90-slim AS builder
WORKDIR /build
COPY Cargo.* build.rs ./
COPY src ./src
RUN cargo build --release

FROM debian:bookworm-slim
RUN apt-get update \
    && apt-get install -y --no-install-recommends ca-certificates curl \
    && rm -rf /var/lib/apt/lists/*
RUN groupadd --system mediashare \
    && useradd --system --gid mediashare --home-dir /app mediashare
WORKDIR /app
COPY --from=builder /build/target/release/mediashare /usr/local/bin/mediashare
USER mediashare
ENV APP_VERSION=1.0.0 \
    ENVIRONMENT=development \
    CLOUD_PROVIDER=unknown
EXPOSE 8000
HEALTHCHECK --interval=30s --timeout=5s --start-period=10s --retries=3 \
    CMD curl -fsS http://127.0.0.1:8000/health || exit 1
ENTRYPOINT ["mediashare"]
CMD ["serve", "--bind", "0.0.0.0:8000"]
"#;

const DOCKERIGNORE: &str = r"target/
.git/
.mediashare-scaffold.json
ansible/
docker/
";

/// Relative path of the container build file within the tree
pub const DOCKERFILE_PATH: &str = "docker/Dockerfile";

/// Relative path of the Ansible config file within the tree
pub const ANSIBLE_CFG_PATH: &str = "ansible/ansible.cfg";

/// The complete deployment tree, in render order
pub const ASSETS: &[Asset] = &[
    Asset {
        path: ANSIBLE_CFG_PATH,
        contents: ANSIBLE_CFG,
    },
    Asset {
        path: "ansible/requirements.yml",
        contents: REQUIREMENTS_YML,
    },
    Asset {
        path: "ansible/inventory/dev.yml",
        contents: INVENTORY_DEV_YML,
    },
    Asset {
        path: "ansible/inventory/prod.yml",
        contents: INVENTORY_PROD_YML,
    },
    Asset {
        path: "ansible/group_vars/all.yml",
        contents: GROUP_VARS_ALL_YML,
    },
    Asset {
        path: "ansible/group_vars/dev.yml",
        contents: GROUP_VARS_DEV_YML,
    },
    Asset {
        path: "ansible/group_vars/prod.yml",
        contents: GROUP_VARS_PROD_YML,
    },
    Asset {
        path: "ansible/playbooks/site.yml",
        contents: PLAYBOOK_SITE_YML,
    },
    Asset {
        path: "ansible/playbooks/deploy.yml",
        contents: PLAYBOOK_DEPLOY_YML,
    },
    Asset {
        path: "ansible/roles/common/tasks/main.yml",
        contents: COMMON_TASKS_YML,
    },
    Asset {
        path: "ansible/roles/common/handlers/main.yml",
        contents: COMMON_HANDLERS_YML,
    },
    Asset {
        path: "ansible/roles/docker/tasks/main.yml",
        contents: DOCKER_TASKS_YML,
    },
    Asset {
        path: "ansible/roles/docker/handlers/main.yml",
        contents: DOCKER_HANDLERS_YML,
    },
    Asset {
        path: "ansible/roles/docker/defaults/main.yml",
        contents: DOCKER_DEFAULTS_YML,
    },
    Asset {
        path: "ansible/roles/mediashare_app/tasks/main.yml",
        contents: APP_TASKS_YML,
    },
    Asset {
        path: "ansible/roles/mediashare_app/defaults/main.yml",
        contents: APP_DEFAULTS_YML,
    },
    Asset {
        path: "ansible/roles/mediashare_app/templates/env.j2",
        contents: APP_ENV_TEMPLATE,
    },
    Asset {
        path: DOCKERFILE_PATH,
        contents: DOCKERFILE,
    },
    Asset {
        path: "docker/.dockerignore",
        contents: DOCKERIGNORE,
    },
];
