mod server_member;
